// Library exports for the CLI and integration tests

pub mod config;
pub mod error;
pub mod events;
pub mod intake;
pub mod logging;
pub mod shutdown;
