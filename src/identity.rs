//! Identity seam: maps stable user ids to group memberships and global
//! capabilities. The host adapts its own account system behind this trait.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::world::UserId;

/// External identity collaborator.
pub trait IdentityProvider {
    /// Names of the groups the user belongs to.
    fn groups_of(&self, user: UserId) -> Vec<String>;

    /// True if the user holds the global "ignore claims" capability and
    /// bypasses all claim checks. Checked by the engine facade before
    /// trust resolution runs.
    fn ignores_claims(&self, user: UserId) -> bool;
}

/// In-memory identity provider for tests and fixtures.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    groups: FxHashMap<UserId, Vec<String>>,
    bypass: FxHashSet<UserId>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_group(&mut self, user: UserId, group: impl Into<String>) {
        self.groups.entry(user).or_default().push(group.into());
    }

    pub fn grant_bypass(&mut self, user: UserId) {
        self.bypass.insert(user);
    }
}

impl IdentityProvider for StaticIdentity {
    fn groups_of(&self, user: UserId) -> Vec<String> {
        self.groups.get(&user).cloned().unwrap_or_default()
    }

    fn ignores_claims(&self, user: UserId) -> bool {
        self.bypass.contains(&user)
    }
}
