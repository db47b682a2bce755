//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types (vectors, poses, rotators)
//! - Handle collections for spawned instances
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
