//! Serial bus access for AX-12 class servos.
//!
//! - [`codec`]: little-endian encoding of control-table values.
//! - [`packet`]: protocol 1.0 instruction and status packets.
//! - [`sync_write`]: SYNC_WRITE frames carrying one payload per actuator.
//! - [`serial`]: a [`Bus`] over any async UART.
//! - [`shared`]: a [`Bus`] handle onto a mutex-guarded bus, for several tasks.
//!
//! The [`Bus`] trait is the seam the controller is written against; the test-suite plugs
//! a recording bus in its place.
use core::fmt::{self, Display, Formatter};

pub mod codec;
pub mod packet;
pub mod serial;
pub mod shared;
pub mod sync_write;

use sync_write::SyncWriteFrame;

/// Error byte of a status packet. Every set bit is an alarm raised by the servo.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServoStatus(u8);

impl ServoStatus {
    pub const INPUT_VOLTAGE: u8 = 1 << 0;
    pub const ANGLE_LIMIT: u8 = 1 << 1;
    pub const OVERHEATING: u8 = 1 << 2;
    pub const RANGE: u8 = 1 << 3;
    pub const CHECKSUM: u8 = 1 << 4;
    pub const OVERLOAD: u8 = 1 << 5;
    pub const INSTRUCTION: u8 = 1 << 6;

    const NAMES: [(u8, &'static str); 7] = [
        (Self::INPUT_VOLTAGE, "input voltage"),
        (Self::ANGLE_LIMIT, "angle limit"),
        (Self::OVERHEATING, "overheating"),
        (Self::RANGE, "range"),
        (Self::CHECKSUM, "checksum"),
        (Self::OVERLOAD, "overload"),
        (Self::INSTRUCTION, "instruction"),
    ];

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }
}

impl Display for ServoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ok");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Half-duplex servo bus. Every call is one complete transaction: at most one is in flight.
#[allow(async_fn_in_trait)]
pub trait Bus {
    type Error: fmt::Debug;

    /// Reads `buf.len()` bytes starting at `address` of servo `id`.
    async fn read(&mut self, id: u8, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `data` starting at `address` of servo `id` and returns the status it answered.
    async fn write(&mut self, id: u8, address: u8, data: &[u8])
        -> Result<ServoStatus, Self::Error>;

    /// Sends one SYNC_WRITE instruction. Broadcast, so no status comes back.
    async fn sync_write(&mut self, frame: &SyncWriteFrame) -> Result<(), Self::Error>;
}

impl<B: Bus> Bus for &mut B {
    type Error = B::Error;

    async fn read(&mut self, id: u8, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(id, address, buf).await
    }

    async fn write(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
    ) -> Result<ServoStatus, Self::Error> {
        (**self).write(id, address, data).await
    }

    async fn sync_write(&mut self, frame: &SyncWriteFrame) -> Result<(), Self::Error> {
        (**self).sync_write(frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lists_raised_alarms() {
        let status = ServoStatus::from_bits(ServoStatus::OVERHEATING | ServoStatus::OVERLOAD);
        assert!(!status.is_ok());
        assert!(status.contains(ServoStatus::OVERLOAD));
        assert!(!status.contains(ServoStatus::RANGE));
        assert_eq!(status.to_string(), "overheating, overload");
        assert_eq!(ServoStatus::default().to_string(), "ok");
    }
}
