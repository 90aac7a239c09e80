use serde::{Deserialize, Serialize};

/// Verdict of a permission check.
///
/// `Undefined` means "no applicable rule / not evaluated" and must never be
/// read as Allow: callers fall through to their own default, which for
/// action cancellation is "do not cancel".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tristate {
    Allow,
    Deny,
    Undefined,
}

impl Tristate {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Tristate::Allow
        } else {
            Tristate::Deny
        }
    }

    /// True for Allow or Deny; Undefined is not decisive.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, Tristate::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Tristate::Allow => Some(true),
            Tristate::Deny => Some(false),
            Tristate::Undefined => None,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        Tristate::from_bool(value)
    }
}
