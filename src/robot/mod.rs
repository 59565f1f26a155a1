//! Core robot types.
//!
//! This module defines the pose controller and the types around it:
//! - [`controller`]: the [`controller::Controller`] owning the pose vectors and the bus.
//! - [`actuators`]: validation of the actuator id list.
//! - [`error`]: the error type every controller operation returns.
//! - [`commands`]: text commands accepted by the firmware and their execution.
pub mod actuators;
pub mod commands;
pub mod controller;
pub mod error;
