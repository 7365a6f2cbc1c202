/*!
 * Security context extractors
 *
 * Responsibility:
 * - hand the SecurityContext resolved by the auth middleware to handlers
 * - fail closed (401) when the middleware did not run
 */
mod security_ctx;

pub use security_ctx::{CurrentPrincipal, Security};
