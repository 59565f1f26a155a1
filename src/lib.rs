//! Library root for the AX-12 pose controller.
//!
//! Re-exports all main modules: [`bus`], [`motion`], [`robot`] and, with the `firmware`
//! feature, [`tasks`]. Used by the firmware binary and by the host test-suite.
#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod motion;
pub mod robot;
#[cfg(feature = "firmware")]
pub mod tasks;

pub use bus::Bus;
pub use motion::clock::{Clock, EmbassyClock};
pub use robot::controller::Controller;
pub use robot::error::Error;
