//! Hardware collaborator contracts.
//!
//! The control core never touches GPIO or the bus directly; it talks to a
//! `SensorSource` and a `BusHandle` created by a driver.

pub mod driver;
