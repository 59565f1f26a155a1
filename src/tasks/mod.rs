//! Asynchronous tasks of the servo firmware.
//!
//! This module contains Embassy async tasks for the controller's runtime:
//! - [`motion_task`]: owns the pose controller and executes pose commands.
//! - [`net_task`]: manages WiFi, the TCP server, and command reception.
//!
//! Tasks are spawned from `main.rs` and communicate via an Embassy channel.
pub mod motion_task;
pub mod net_task;
