use serde::{Deserialize, Serialize};

use crate::world::UserId;

/// Capability a subject holds within a claim.
///
/// Ordered for storage, but coverage between levels depends on the check
/// being performed; see [`TrustHierarchy`]. Do not compare levels with
/// `>=` to decide permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustLevel {
    /// May enter and interact with non-inventory blocks.
    Accessor,
    /// May open inventories (chests, furnaces).
    Container,
    /// May place and break blocks.
    Builder,
    /// May edit trust lists and claim settings.
    Manager,
}

impl TrustLevel {
    pub const ALL: [TrustLevel; 4] = [
        TrustLevel::Accessor,
        TrustLevel::Container,
        TrustLevel::Builder,
        TrustLevel::Manager,
    ];

    fn index(self) -> usize {
        match self {
            TrustLevel::Accessor => 0,
            TrustLevel::Container => 1,
            TrustLevel::Builder => 2,
            TrustLevel::Manager => 3,
        }
    }
}

/// Who a trust entry applies to: a single user or a named group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustSubject {
    User(UserId),
    Group(String),
}

/// Coverage matrix between a held trust level and a required one.
///
/// Different flags use different minimum-trust semantics, so the hierarchy
/// is passed into every check rather than baked into [`TrustLevel`].
#[derive(Debug, Clone)]
pub struct TrustHierarchy {
    covers: [[bool; 4]; 4],
}

impl TrustHierarchy {
    /// Standard coverage: Manager covers everything, Builder covers
    /// Container and Accessor, Container covers Accessor.
    pub fn standard() -> Self {
        let mut covers = [[false; 4]; 4];
        for held in TrustLevel::ALL {
            for required in TrustLevel::ALL {
                covers[held.index()][required.index()] = held.index() >= required.index();
            }
        }
        Self { covers }
    }

    /// Coverage for checks that only distinguish "has any access" from
    /// "has none": every level covers Accessor and nothing else.
    pub fn access_only() -> Self {
        let mut covers = [[false; 4]; 4];
        for held in TrustLevel::ALL {
            covers[held.index()][TrustLevel::Accessor.index()] = true;
        }
        Self { covers }
    }

    /// True if a subject holding `held` satisfies a check requiring `required`.
    pub fn covers(&self, held: TrustLevel, required: TrustLevel) -> bool {
        self.covers[held.index()][required.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_hierarchy_is_monotonic() {
        let h = TrustHierarchy::standard();
        assert!(h.covers(TrustLevel::Manager, TrustLevel::Accessor));
        assert!(h.covers(TrustLevel::Manager, TrustLevel::Builder));
        assert!(h.covers(TrustLevel::Builder, TrustLevel::Container));
        assert!(!h.covers(TrustLevel::Builder, TrustLevel::Manager));
        assert!(!h.covers(TrustLevel::Accessor, TrustLevel::Container));
    }

    #[test]
    fn access_only_collapses_upper_levels() {
        let h = TrustHierarchy::access_only();
        assert!(h.covers(TrustLevel::Accessor, TrustLevel::Accessor));
        assert!(h.covers(TrustLevel::Manager, TrustLevel::Accessor));
        assert!(!h.covers(TrustLevel::Manager, TrustLevel::Builder));
    }
}
