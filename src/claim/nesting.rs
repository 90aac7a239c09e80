use serde::{Deserialize, Serialize};

use crate::claim::claim::ClaimType;

/// One explicit table deciding which claim types may nest inside which.
///
/// The defaults: towns may contain basic, admin, and subdivision claims;
/// basic and admin claims may contain subdivisions; nothing contains a town
/// or wilderness; subdivisions are leaves. Any pair can be overridden from
/// configuration.
#[derive(Debug, Clone)]
pub struct NestingPolicy {
    allowed: [[bool; 5]; 5],
}

/// A single configured override of the default nesting table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestingOverride {
    pub parent: ClaimType,
    pub child: ClaimType,
    pub allowed: bool,
}

impl Default for NestingPolicy {
    fn default() -> Self {
        let mut allowed = [[false; 5]; 5];
        allowed[ClaimType::Town.index()][ClaimType::Basic.index()] = true;
        allowed[ClaimType::Town.index()][ClaimType::Admin.index()] = true;
        allowed[ClaimType::Town.index()][ClaimType::Subdivision.index()] = true;
        allowed[ClaimType::Basic.index()][ClaimType::Subdivision.index()] = true;
        allowed[ClaimType::Admin.index()][ClaimType::Subdivision.index()] = true;
        Self { allowed }
    }
}

impl NestingPolicy {
    pub fn with_overrides(overrides: &[NestingOverride]) -> Self {
        let mut policy = Self::default();
        for o in overrides {
            policy.set_allowed(o.parent, o.child, o.allowed);
        }
        policy
    }

    pub fn allows(&self, parent: ClaimType, child: ClaimType) -> bool {
        self.allowed[parent.index()][child.index()]
    }

    pub fn set_allowed(&mut self, parent: ClaimType, child: ClaimType, allowed: bool) {
        self.allowed[parent.index()][child.index()] = allowed;
    }
}
