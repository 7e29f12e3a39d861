/// The `config` module provides configuration handling
pub mod config;

/// The `error` module provides error handling
pub mod error;

/// The `traits` module provides the host-facing traits
pub mod traits;
