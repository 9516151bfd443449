//! Line Tracer Common Library
//!
//! This crate provides the types shared by every crate of the line tracer
//! workspace.
//!
//! # Module Structure
//!
//! - [`sensor`] - Sensor snapshots and 4-bit patterns
//! - [`motor`] - Motor commands and wheel directions
//! - [`hal`] - Hardware collaborator traits and errors
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Wire opcodes, defaults and limits
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use tracer_common::prelude::*;
//!
//! let state: SensorState = "0110".parse().unwrap();
//! assert_eq!(state.pattern().index(), 0b0110);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod motor;
pub mod prelude;
pub mod sensor;
