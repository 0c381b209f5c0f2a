//! Shelf Application Library
//!
//! This library provides the application modules and utilities for the shelf
//! personal library service.

pub mod modules;
pub mod utils;
