//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types, colours and coordinate conversions
//! - Time management
//! - Logging and the log sink read by the developer console

pub mod math;
pub mod time;
pub mod logging;
