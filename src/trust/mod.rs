//! Trust model: levels a subject may hold within a claim and the resolver
//! that computes the effective level, honoring groups and parent inheritance.

pub mod level;
pub mod resolver;

pub use level::{TrustHierarchy, TrustLevel, TrustSubject};
pub use resolver::TrustResolver;
