use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::flag::context::ContextSet;
use crate::flag::matcher::ContextualRule;
use crate::flag::tristate::Tristate;

/// A configured tri-state value for a flag, scoped by context tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRule {
    pub flag: String,
    pub contexts: ContextSet,
    pub value: Tristate,
}

impl ContextualRule for FlagRule {
    fn contexts(&self) -> &ContextSet {
        &self.contexts
    }
}

/// Typed value for an option rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

/// A configured typed option value, scoped the same way as flag rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRule {
    pub option: String,
    pub contexts: ContextSet,
    pub value: OptionValue,
}

impl ContextualRule for OptionRule {
    fn contexts(&self) -> &ContextSet {
        &self.contexts
    }
}

/// All configured flag and option rules, grouped by name.
///
/// Rules are never merged: setting a value for an identical context set
/// replaces the previous rule (last write wins); otherwise the rule is
/// added alongside the existing ones and the matcher picks between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    flags: FxHashMap<String, Vec<FlagRule>>,
    options: FxHashMap<String, Vec<OptionRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, flag: impl Into<String>, contexts: ContextSet, value: Tristate) {
        let flag = flag.into();
        let rules = self.flags.entry(flag.clone()).or_default();
        match rules.iter_mut().find(|r| r.contexts == contexts) {
            Some(existing) => existing.value = value,
            None => rules.push(FlagRule {
                flag,
                contexts,
                value,
            }),
        }
    }

    pub fn flag_rules(&self, flag: &str) -> &[FlagRule] {
        self.flags.get(flag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_option(
        &mut self,
        option: impl Into<String>,
        contexts: ContextSet,
        value: OptionValue,
    ) {
        let option = option.into();
        let rules = self.options.entry(option.clone()).or_default();
        match rules.iter_mut().find(|r| r.contexts == contexts) {
            Some(existing) => existing.value = value,
            None => rules.push(OptionRule {
                option,
                contexts,
                value,
            }),
        }
    }

    pub fn option_rules(&self, option: &str) -> &[OptionRule] {
        self.options.get(option).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.flags.clear();
        self.options.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::context::{Context, ContextKey};

    #[test]
    fn identical_context_set_replaces() {
        let mut rules = RuleSet::new();
        let ctx = ContextSet::new().with(Context::new(ContextKey::Group, "crew"));
        rules.set_flag("block-break", ctx.clone(), Tristate::Deny);
        rules.set_flag("block-break", ctx, Tristate::Allow);
        let stored = rules.flag_rules("block-break");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, Tristate::Allow);
    }

    #[test]
    fn different_context_sets_coexist() {
        let mut rules = RuleSet::new();
        rules.set_flag("block-break", ContextSet::new(), Tristate::Deny);
        rules.set_flag(
            "block-break",
            ContextSet::new().with(Context::new(ContextKey::Group, "crew")),
            Tristate::Allow,
        );
        assert_eq!(rules.flag_rules("block-break").len(), 2);
    }
}
