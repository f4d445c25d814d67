//! Stepfn Resolver
//!
//! Rewrites symbolic resource references in a state machine definition into
//! concrete, emulator-routable identifiers. The transform is pure, depth-first
//! and order-independent: no two references interact, and anything the
//! document model does not recognize passes through untouched. Seeding is a
//! development convenience, so a malformed reference is never an error.

mod resolver;

pub use resolver::{ResolvedDefinition, lambda_arn, resolve};
