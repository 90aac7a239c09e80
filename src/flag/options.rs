use rustc_hash::FxHashMap;

use crate::flag::context::ContextSet;
use crate::flag::matcher;
use crate::flag::rule::{OptionValue, RuleSet};
use crate::world::ClaimId;

/// Resolve a typed option through the same context machinery as flags.
pub fn resolve_option(
    rules: &RuleSet,
    option: &str,
    request: &ContextSet,
) -> Option<OptionValue> {
    matcher::select(rules.option_rules(option), request).map(|r| r.value.clone())
}

/// Per-actor cache of resolved option values keyed by `(claim, option)`.
///
/// Options like movement speed are read every tick while the answer only
/// changes when the actor crosses a claim boundary, so entries are
/// invalidated explicitly on transition instead of being recomputed by
/// identity comparisons on shared state.
#[derive(Debug, Default)]
pub struct OptionCache {
    entries: FxHashMap<(ClaimId, String), OptionValue>,
    current_claim: Option<ClaimId>,
}

impl OptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note the claim the actor now stands in; crossing a boundary drops
    /// every cached value.
    pub fn on_claim_transition(&mut self, claim: ClaimId) {
        if self.current_claim != Some(claim) {
            self.entries.clear();
            self.current_claim = Some(claim);
        }
    }

    pub fn get(&self, claim: ClaimId, option: &str) -> Option<&OptionValue> {
        self.entries.get(&(claim, option.to_string()))
    }

    pub fn put(&mut self, claim: ClaimId, option: impl Into<String>, value: OptionValue) {
        self.entries.insert((claim, option.into()), value);
    }
}
