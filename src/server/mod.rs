mod analyze_routes;
pub mod config;
mod http_layers;
mod letter_routes;
pub mod metrics;
mod report_routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};

#[cfg(test)]
mod test_support;
