pub mod config;
pub mod logging;
pub mod route_compute;
