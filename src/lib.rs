#[cfg(feature = "web-interface")]
pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod scheduling;
pub mod shutdown;
pub mod startup;
pub mod utils;
pub mod workflow;
