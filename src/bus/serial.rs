//! Protocol 1.0 [`Bus`] over an async UART.
//!
//! The UART must already be wired half-duplex (tri-state buffer or single-wire adapter).
//! When the adapter loops transmitted bytes back to RX, enable [`SerialBus::with_echo`] so
//! they are discarded before the status packet is read.
use core::fmt::{self, Display, Formatter};

use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, ReadExactError, Write};
use log::{debug, warn};

use super::packet::{
    self, PacketError, StatusPacket, MAX_PACKET_LEN, MAX_PARAMS, STATUS_PREFIX_LEN,
};
use super::sync_write::SyncWriteFrame;
use super::{Bus, ServoStatus};
use crate::config::{BROADCAST_ID, INST_READ, INST_SYNC_WRITE, INST_WRITE, STATUS_TIMEOUT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<E> {
    Io(E),
    /// No complete status packet within the status timeout.
    Timeout,
    UnexpectedEof,
    Packet(PacketError),
    IdMismatch { expected: u8, actual: u8 },
    /// Status carried a different number of bytes than requested.
    LengthMismatch { expected: usize, actual: usize },
}

impl<E> From<PacketError> for BusError<E> {
    fn from(err: PacketError) -> Self {
        BusError::Packet(err)
    }
}

impl<E> From<ReadExactError<E>> for BusError<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => BusError::UnexpectedEof,
            ReadExactError::Other(e) => BusError::Io(e),
        }
    }
}

impl<E: fmt::Debug> Display for BusError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Io(e) => write!(f, "uart error: {e:?}"),
            BusError::Timeout => f.write_str("status packet timed out"),
            BusError::UnexpectedEof => f.write_str("uart closed mid-packet"),
            BusError::Packet(e) => write!(f, "bad packet: {e}"),
            BusError::IdMismatch { expected, actual } => {
                write!(f, "status from servo {actual}, expected {expected}")
            }
            BusError::LengthMismatch { expected, actual } => {
                write!(f, "status carried {actual} bytes, expected {expected}")
            }
        }
    }
}

pub struct SerialBus<U> {
    uart: U,
    echo: bool,
    status_timeout: Duration,
}

impl<U> SerialBus<U>
where
    U: Read + Write,
{
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            echo: false,
            status_timeout: Duration::from_millis(STATUS_TIMEOUT_MS),
        }
    }

    /// Discard the copy of every transmitted packet the adapter echoes back.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    pub fn into_inner(self) -> U {
        self.uart
    }

    async fn transmit(&mut self, packet: &[u8]) -> Result<(), BusError<U::Error>> {
        self.uart.write_all(packet).await.map_err(BusError::Io)?;
        self.uart.flush().await.map_err(BusError::Io)?;

        if self.echo {
            let mut echo = [0u8; MAX_PACKET_LEN];
            let echo = &mut echo[..packet.len()];
            with_timeout(self.status_timeout, self.uart.read_exact(echo))
                .await
                .map_err(|_| BusError::Timeout)??;
        }
        Ok(())
    }

    /// Reads one status packet into `buf` and checks it comes from `id`.
    async fn receive<'b>(
        &mut self,
        id: u8,
        buf: &'b mut [u8; MAX_PACKET_LEN],
    ) -> Result<StatusPacket<'b>, BusError<U::Error>> {
        let len = with_timeout(self.status_timeout, Self::read_status(&mut self.uart, buf))
            .await
            .map_err(|_| BusError::Timeout)??;

        let status = StatusPacket::parse(&buf[..len])?;
        if status.id != id {
            return Err(BusError::IdMismatch {
                expected: id,
                actual: status.id,
            });
        }
        if !status.status.is_ok() {
            warn!("[BUS] servo {id} reports {}", status.status);
        }
        Ok(status)
    }

    async fn read_status(uart: &mut U, buf: &mut [u8]) -> Result<usize, BusError<U::Error>> {
        uart.read_exact(&mut buf[..STATUS_PREFIX_LEN]).await?;
        if buf[..packet::HEADER.len()] != packet::HEADER {
            return Err(PacketError::BadHeader.into());
        }
        let len = STATUS_PREFIX_LEN + buf[STATUS_PREFIX_LEN - 1] as usize;
        uart.read_exact(&mut buf[STATUS_PREFIX_LEN..len]).await?;
        Ok(len)
    }
}

impl<U> Bus for SerialBus<U>
where
    U: Read + Write,
{
    type Error = BusError<U::Error>;

    async fn read(&mut self, id: u8, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let count = u8::try_from(buf.len()).map_err(|_| PacketError::TooLarge {
            params: buf.len(),
        })?;
        let packet = packet::instruction(id, INST_READ, &[address, count])?;
        self.transmit(&packet).await?;

        let mut rx = [0u8; MAX_PACKET_LEN];
        let status = self.receive(id, &mut rx).await?;
        if status.params.len() != buf.len() {
            return Err(BusError::LengthMismatch {
                expected: buf.len(),
                actual: status.params.len(),
            });
        }
        buf.copy_from_slice(status.params);
        Ok(())
    }

    async fn write(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
    ) -> Result<ServoStatus, Self::Error> {
        if data.len() >= MAX_PARAMS {
            return Err(PacketError::TooLarge {
                params: data.len() + 1,
            }
            .into());
        }
        let mut params = [0u8; MAX_PARAMS];
        params[0] = address;
        params[1..=data.len()].copy_from_slice(data);
        let packet = packet::instruction(id, INST_WRITE, &params[..=data.len()])?;
        self.transmit(&packet).await?;

        if id == BROADCAST_ID {
            return Ok(ServoStatus::default());
        }
        let mut rx = [0u8; MAX_PACKET_LEN];
        let status = self.receive(id, &mut rx).await?;
        Ok(status.status)
    }

    async fn sync_write(&mut self, frame: &SyncWriteFrame) -> Result<(), Self::Error> {
        let packet = packet::instruction(BROADCAST_ID, INST_SYNC_WRITE, frame.parameters())?;
        debug!(
            "[BUS] sync write of {} servos at {:#04x}",
            frame.len(),
            frame.address()
        );
        self.transmit(&packet).await
    }
}
