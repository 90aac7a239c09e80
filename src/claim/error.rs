use thiserror::Error;

use crate::claim::claim::ClaimType;
use crate::world::ClaimId;

/// Errors from claim mutations. All are recoverable and surfaced to the
/// caller for user messaging; none abort the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// The new boundary conflicts with another claim. Carries the offending
    /// claim so the caller can report it.
    #[error("boundary overlaps claim {0}")]
    Overlap(ClaimId),

    /// A Y corner lies outside the permitted range.
    #[error("boundary outside permitted y-range {min}..={max}")]
    Level { min: i32, max: i32 },

    /// The acting user already holds the maximum number of claims of this type.
    #[error("claim limit of {limit} reached for {claim_type:?} claims")]
    Limit { claim_type: ClaimType, limit: u32 },

    #[error("claim type {child:?} may not nest inside {parent:?}")]
    IllegalNesting { parent: ClaimType, child: ClaimType },

    /// A child claim's boundary must lie within its parent's.
    #[error("boundary extends outside parent claim {0}")]
    OutsideParent(ClaimId),

    /// Shrinking a claim may not strand a child outside the new boundary.
    #[error("child claim {0} would fall outside the new boundary")]
    ChildOutsideBoundary(ClaimId),

    #[error("no claim with id {0}")]
    UnknownClaim(ClaimId),

    /// Structural mutation attempted while a resolution batch is open.
    #[error("claim mutation attempted during an open resolution batch")]
    MutationDuringBatch,
}
