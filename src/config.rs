//! Protocol constants and controller tuning.
use embassy_time::Duration;

// CONTROL TABLE (AX-12, protocol 1.0)
pub const TORQUE_ENABLE: u8 = 24;
pub const GOAL_POSITION: u8 = 30;
pub const PRESENT_POSITION: u8 = 36;

// INSTRUCTIONS
pub const INST_READ: u8 = 0x02;
pub const INST_WRITE: u8 = 0x03;
pub const INST_SYNC_WRITE: u8 = 0x83;

pub const BROADCAST_ID: u8 = 0xFE;
/// Highest id an actuator can be configured with.
pub const MAX_ID: u8 = 0xFD;

// BUS
pub const BAUD_RATE: u32 = 1_000_000;
/// Upper bound on the wait for a status packet after an instruction.
pub const STATUS_TIMEOUT_MS: u64 = 10;

// MOVEMENT
/// Minimum interval between two goal-position frames.
pub const FRAME_LENGTH_MS: u64 = 33;
/// Bus turnaround pause after each register read of a full pose read.
pub const READ_POSE_DELAY_MS: u64 = 25;
pub const CENTER_POSITION: u16 = 512;
/// Duration of the `c` (center) command.
pub const CENTER_DURATION_MS: u32 = 1000;
pub const MAX_ACTUATORS: usize = 32;

/// Ids of the twelve servos the firmware drives.
pub const DEFAULT_IDS: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

// NETWORK
pub const PORT: u16 = 1234;
pub const RX_BUF_SIZE: usize = 1024;
pub const TX_BUF_SIZE: usize = 1024;
pub const POSECMD_CHANNEL_SIZE: usize = 4;

/// Runtime tuning of a [`Controller`](crate::robot::controller::Controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub frame_length: Duration,
    pub read_delay: Duration,
    /// Position every joint holds before the first pose is read or loaded.
    pub center_position: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            frame_length: Duration::from_millis(FRAME_LENGTH_MS),
            read_delay: Duration::from_millis(READ_POSE_DELAY_MS),
            center_position: CENTER_POSITION,
        }
    }
}
