//! Claim model and storage: cuboid regions, parent/child nesting, the
//! per-world chunk-bucketed index, and the store that validates mutations.

pub mod claim;
pub mod error;
pub mod index;
pub mod nesting;
pub mod region;
pub mod store;

pub use claim::{Claim, ClaimType};
pub use error::ClaimError;
pub use index::ChunkClaimIndex;
pub use nesting::NestingPolicy;
pub use region::ClaimBox;
pub use store::{ChildPolicy, ClaimHint, ClaimRules, ClaimStore, CreateClaim};
