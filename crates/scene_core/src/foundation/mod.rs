//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Fixed-capacity pool allocation
//! - Collections and identifiers
//! - Logging utilities

pub mod math;
pub mod memory;
pub mod collections;
pub mod logging;
