//! Stepfn Definition
//!
//! This crate provides the typed document model for Amazon States Language
//! definitions as stepfn-local sees them. Raw JSON is decoded into a closed
//! tagged shape ([`StateNode`]) at the boundary so the resolver operates over
//! typed variants instead of ad hoc field probing; [`StateNode::encode`] is
//! the matching thin adapter back to raw JSON.
//!
//! Decoding never fails: any shape the model does not recognize (including
//! malformed reference objects) becomes an opaque node that re-encodes
//! byte-identically. Seeding is best-effort, so unknown shapes pass through
//! rather than aborting a batch.

mod node;
mod resource;

pub use node::StateNode;
pub use resource::{GetAttForm, ResourceRef};
