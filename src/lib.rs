// src/lib.rs

pub mod catalogue;
pub mod config;
pub mod core;
pub mod error;
pub mod persistence;

pub use crate::config::EngineConfig;
pub use crate::core::engine::RankingCoordinator;
pub use crate::error::{EngineError, Result};
