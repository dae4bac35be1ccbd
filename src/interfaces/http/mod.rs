//! HTTP REST API
//!
//! - `common`: response envelope, error mapping, validating extractors
//! - `middleware`: bearer token verification and role gates
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, cross-cutting layers and Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

#[cfg(test)]
pub mod test_support;

pub use router::{create_router, ApiDoc, ApiState, RateLimit, RouterOptions};
