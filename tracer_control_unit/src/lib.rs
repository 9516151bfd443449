//! # Line Tracer Control Unit Library
//!
//! Reactive steering core of the line tracer. Every tick reads four line
//! sensors, maps the pattern to differential wheel speeds and sends one
//! drive frame to the motor controller.
//!
//! ## Tick Pipeline
//!
//! ```text
//! SensorSource ─► DecisionEngine ─► ActuationEncoder ─► BusHandle
//!                      ▲    │
//!                      │    ▼
//!                 HysteresisStore
//! ```
//!
//! - [`decision`]: primary and fallback speed tables
//! - [`hysteresis`]: last effective pattern, bridges line-lost ticks
//! - [`actuation`]: drive/stop frame encoding and delivery checks
//! - [`cycle`]: fixed-rate loop, statistics, RT setup
//! - [`config`]: file + command-line configuration

pub mod actuation;
pub mod config;
pub mod cycle;
pub mod decision;
pub mod hysteresis;
