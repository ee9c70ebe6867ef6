//! Routes Module
//!
//! HTTP route configuration for the backend server.
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports
//! ├── router.rs       - Router assembly and layers
//! └── api_routes.rs   - /api routes
//! ```

pub mod api_routes;
pub mod router;

pub use api_routes::configure_api_routes;
pub use router::{create_router, BODY_LIMIT_BYTES};
