//! Flag and option resolution: the context-matched rule layer, the
//! blacklist, the intra-action result cache, and the decision pipeline.

pub mod action;
pub mod blacklist;
pub mod context;
pub mod engine;
pub mod matcher;
pub mod options;
pub mod result_cache;
pub mod rule;
pub mod tristate;

pub use action::ActionKind;
pub use blacklist::Blacklist;
pub use context::{Context, ContextKey, ContextSet};
pub use engine::{FlagResolutionEngine, ResolveRequest};
pub use matcher::{select, ContextualRule};
pub use options::{resolve_option, OptionCache};
pub use result_cache::{CachedVerdict, ResultCache};
pub use rule::{FlagRule, OptionRule, OptionValue, RuleSet};
pub use tristate::Tristate;
