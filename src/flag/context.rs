use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::claim::{Claim, ClaimType};
use crate::world::{ClaimId, WorldId};

/// Scope of a context tag. The matcher treats tags as opaque set members;
/// the key only matters for the fixed tie-break precedence:
/// claim > claim-type > world > group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContextKey {
    Claim,
    ClaimType,
    World,
    Group,
}

impl ContextKey {
    /// Tie-break precedence; larger is more specific.
    pub fn rank(&self) -> u32 {
        match self {
            ContextKey::Claim => 4,
            ContextKey::ClaimType => 3,
            ContextKey::World => 2,
            ContextKey::Group => 1,
        }
    }
}

/// A single `(key, value)` tag scoping a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Context {
    pub key: ContextKey,
    pub value: String,
}

impl Context {
    pub fn new(key: ContextKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn claim(id: ClaimId) -> Self {
        Self::new(ContextKey::Claim, id.to_string())
    }

    pub fn claim_type(claim_type: ClaimType) -> Self {
        Self::new(ContextKey::ClaimType, claim_type.name())
    }

    pub fn world(id: WorldId) -> Self {
        Self::new(ContextKey::World, id.to_string())
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(ContextKey::Group, name)
    }
}

/// An ordered set of context tags. Rules carry the tags that must all be
/// present in a request for the rule to apply; requests carry every tag
/// that describes the situation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextSet(BTreeSet<Context>);

impl ContextSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, context: Context) -> Self {
        self.0.insert(context);
        self
    }

    pub fn insert(&mut self, context: Context) {
        self.0.insert(context);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_subset_of(&self, request: &ContextSet) -> bool {
        self.0.is_subset(&request.0)
    }

    /// Sum of key ranks, used to break specificity ties between rules
    /// with equally many matching tags.
    pub fn rank_sum(&self) -> u32 {
        self.0.iter().map(|c| c.key.rank()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Context> {
        self.0.iter()
    }

    /// The full request context for a check: world, claim id, claim type,
    /// and the acting user's groups.
    pub fn for_request(claim: &Claim, groups: &[String]) -> Self {
        let mut set = ContextSet::new()
            .with(Context::world(claim.world))
            .with(Context::claim(claim.id))
            .with(Context::claim_type(claim.claim_type));
        for group in groups {
            set.insert(Context::group(group.clone()));
        }
        set
    }
}

impl FromIterator<Context> for ContextSet {
    fn from_iter<T: IntoIterator<Item = Context>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
