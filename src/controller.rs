//! Application wiring: builds the store and services from configuration and
//! exposes the commands the binary runs.

pub mod controller_handler;

pub use controller_handler::Controller;

#[cfg(test)]
pub mod integration_tests;
