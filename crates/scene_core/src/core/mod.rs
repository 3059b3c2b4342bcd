//! # Core Engine Module
//!
//! Shared configuration used by every subsystem of the frame loop.
//!
//! ## Organization
//!
//! - **Config**: capacities and defaults for pools, queues, cameras and the octree
//! - **Foundation**: re-exported low-level utilities (math, pools, collections, logging)

pub mod config;

pub use crate::foundation;

pub use config::{
    CameraDefaults,
    Config,
    ConfigError,
    ConfigFormat,
    EngineConfig,
    PoolConfig,
    QueueConfig,
};
