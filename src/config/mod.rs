//! Configuration management for walkpool
//!
//! Settings are layered with figment: embedded defaults, then an optional
//! TOML file, then `WALKPOOL_` environment variables. See [`core`] for the
//! loading chain.

pub mod core;
pub mod types;

pub use types::{ErrorPolicy, PoolConfig, WalkConfig, WalkpoolConfig};
