/*
 * Responsibility
 * - Router-level layers: auth pipeline, HTTP infrastructure, CORS
 * - Each submodule exposes `apply(router, ...)`
 */
pub mod auth;
pub mod cors;
pub mod http;
