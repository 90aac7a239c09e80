use serde::{Deserialize, Serialize};

use crate::trust::{TrustHierarchy, TrustLevel};

/// Platform-neutral action categories.
///
/// The host's event layer maps its own event vocabulary (dozens of
/// subtypes) onto this union before calling the engine, keeping platform
/// types out of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    BlockBreak,
    BlockPlace,
    /// In-place block mutation (trample, till, redstone retarget).
    BlockModify,
    InteractBlock,
    /// Opening chests, furnaces, other inventories.
    InteractInventory,
    ItemUse,
    EntityDamage,
    EntitySpawn,
    Explosion,
    FluidFlow,
    Ignite,
    ProjectileImpact,
    Enter,
    Exit,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::BlockBreak,
        ActionKind::BlockPlace,
        ActionKind::BlockModify,
        ActionKind::InteractBlock,
        ActionKind::InteractInventory,
        ActionKind::ItemUse,
        ActionKind::EntityDamage,
        ActionKind::EntitySpawn,
        ActionKind::Explosion,
        ActionKind::FluidFlow,
        ActionKind::Ignite,
        ActionKind::ProjectileImpact,
        ActionKind::Enter,
        ActionKind::Exit,
    ];

    /// Stable flag name used in rule configuration and cache keys.
    pub fn flag_name(&self) -> &'static str {
        match self {
            ActionKind::BlockBreak => "block-break",
            ActionKind::BlockPlace => "block-place",
            ActionKind::BlockModify => "block-modify",
            ActionKind::InteractBlock => "interact-block",
            ActionKind::InteractInventory => "interact-inventory",
            ActionKind::ItemUse => "item-use",
            ActionKind::EntityDamage => "entity-damage",
            ActionKind::EntitySpawn => "entity-spawn",
            ActionKind::Explosion => "explosion",
            ActionKind::FluidFlow => "fluid-flow",
            ActionKind::Ignite => "ignite",
            ActionKind::ProjectileImpact => "projectile-impact",
            ActionKind::Enter => "enter-claim",
            ActionKind::Exit => "exit-claim",
        }
    }

    pub fn from_flag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.flag_name() == name)
    }

    /// Trust level this action requires by default. `None` for actions
    /// that are never satisfied by trust alone (world mechanics).
    pub fn default_required_trust(&self) -> Option<TrustLevel> {
        match self {
            ActionKind::BlockBreak
            | ActionKind::BlockPlace
            | ActionKind::BlockModify
            | ActionKind::FluidFlow
            | ActionKind::Ignite => Some(TrustLevel::Builder),
            ActionKind::InteractInventory => Some(TrustLevel::Container),
            ActionKind::InteractBlock
            | ActionKind::ItemUse
            | ActionKind::Enter
            | ActionKind::Exit => Some(TrustLevel::Accessor),
            ActionKind::EntityDamage | ActionKind::ProjectileImpact => Some(TrustLevel::Builder),
            ActionKind::EntitySpawn | ActionKind::Explosion => None,
        }
    }

    /// Build-gated actions take the ownership fast path: the claim owner
    /// is allowed without consulting trust lists.
    pub fn is_build_like(&self) -> bool {
        matches!(
            self,
            ActionKind::BlockBreak
                | ActionKind::BlockPlace
                | ActionKind::BlockModify
                | ActionKind::FluidFlow
                | ActionKind::Ignite
                | ActionKind::Explosion
        )
    }

    /// Coverage matrix for this action's trust check. Enter/Exit only
    /// distinguish "has any access" from "has none".
    pub fn trust_hierarchy(&self) -> TrustHierarchy {
        match self {
            ActionKind::Enter | ActionKind::Exit => TrustHierarchy::access_only(),
            _ => TrustHierarchy::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names_round_trip() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_flag_name(kind.flag_name()), Some(kind));
        }
        assert_eq!(ActionKind::from_flag_name("no-such-flag"), None);
    }

    #[test]
    fn build_like_actions_require_builder() {
        for kind in ActionKind::ALL {
            if kind.is_build_like() && kind != ActionKind::Explosion {
                assert_eq!(kind.default_required_trust(), Some(TrustLevel::Builder));
            }
        }
    }
}
