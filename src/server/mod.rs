//! Session HTTP surface
//!
//! Serves the dashboard session over HTTP: rule list and selection
//! protocol, condition explorer, per-view render models, concept
//! registry CRUD, and liveness.
//!
//! # Endpoints
//!
//! - `/health` - Liveness, dataset name, protocol counters
//! - `/api/v1/session` - Descriptor, flavor, selection, counters
//! - `/api/v1/rules*` - Rule table, toggle-select, flavor switch
//! - `/api/v1/explorer*` - Pending condition path, submit, result
//! - `/api/v1/documents|statistics|projection|overview` - View models
//! - `/api/v1/concepts*` - Concept registry CRUD

pub mod concepts_routes;
pub mod errors;
pub mod explorer_routes;
pub mod observability_routes;
pub mod rules_routes;
pub mod server;
pub mod views_routes;

pub use errors::ErrorResponse;
pub use server::HttpServer;
