use std::path::Path;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

use crate::claim::nesting::NestingOverride;
use crate::claim::store::{ChildPolicy, ClaimRules};
use crate::flag::{Blacklist, RuleSet};

/// Static engine settings, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub claims: ClaimRules,
    pub child_policy: ChildPolicy,
    pub nesting_overrides: Vec<NestingOverride>,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&input)?)
    }
}

/// Everything the resolution path reads from configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigData {
    pub settings: Settings,
    pub rules: RuleSet,
    pub blacklist: Blacklist,
}

/// Shared, hot-reloadable configuration handle.
///
/// The host replaces the whole data block on reload; readers in the
/// resolution path take a short read lock per check and never observe a
/// half-applied reload.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ConfigData>>,
}

impl ConfigHandle {
    pub fn new(data: ConfigData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ConfigData> {
        self.inner.read()
    }

    /// Swap in a freshly loaded configuration.
    pub fn replace(&self, data: ConfigData) {
        *self.inner.write() = data;
    }

    /// Mutate configuration in place (rule edits from runtime commands).
    pub fn update<F: FnOnce(&mut ConfigData)>(&self, f: F) {
        f(&mut self.inner.write());
    }
}
