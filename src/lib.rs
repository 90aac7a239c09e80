//! Access-control engine for a shared, mutable spatial world.
//!
//! For every world-altering action the engine decides whether the acting
//! party is permitted, by resolving a point-in-world query against a
//! hierarchy of user-defined claims, a multi-level trust model, and a
//! layered flag/option configuration with contextual overrides. The host's
//! event layer maps platform events onto [`ActionKind`] and consumes a
//! [`Tristate`] verdict; everything platform-specific stays outside.

pub mod attribution;
pub mod claim;
pub mod config;
pub mod engine;
pub mod flag;
pub mod identity;
pub mod persist;
pub mod trust;
pub mod world;

pub use attribution::{
    AttributionCache, AttributionKind, AttributionStore, FileAttributionStore,
    NullAttributionStore,
};
pub use claim::{
    ChildPolicy, Claim, ClaimBox, ClaimError, ClaimHint, ClaimRules, ClaimStore, ClaimType,
    CreateClaim, NestingPolicy,
};
pub use config::{ConfigData, ConfigHandle, Settings};
pub use engine::{ActionRequest, ClaimEngine};
pub use flag::{
    ActionKind, Blacklist, Context, ContextKey, ContextSet, FlagResolutionEngine, FlagRule,
    OptionValue, ResolveRequest, RuleSet, Tristate,
};
pub use identity::{IdentityProvider, StaticIdentity};
pub use persist::PersistError;
pub use trust::{TrustHierarchy, TrustLevel, TrustResolver, TrustSubject};
pub use world::{BlockPos, ChunkPos, ClaimId, UserId, WorldId};
