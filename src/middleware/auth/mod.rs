pub mod access;
pub mod context;
pub mod failure;
pub mod policy;

pub use context::SecurityContext;
pub use failure::AuthFailure;
pub use policy::{AccessPolicy, Decision, Requirement};
