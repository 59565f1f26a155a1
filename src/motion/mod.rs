//! Frame pacing and pose interpolation.
//!
//! - [`clock`]: the [`clock::Clock`] seam used to suspend until the next frame boundary.
//! - [`interpolation`]: the constant-speed interpolation session advanced once per frame.
//!
//! Driven by [`Controller`](crate::robot::controller::Controller), which owns the pose
//! vectors and the bus.
pub mod clock;
pub mod interpolation;
