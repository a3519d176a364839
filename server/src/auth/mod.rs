//! Authentication for admin endpoints.

mod middleware;

pub use middleware::*;
