//! HTTP API handlers for kaktus-ra

pub mod analyze;
pub mod health;
pub mod single;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use single::single_step_routes;
