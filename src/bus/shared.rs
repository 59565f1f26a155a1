//! Sharing one half-duplex bus between tasks.
//!
//! The bus lives in an [`embassy_sync::mutex::Mutex`]; every [`SharedBus`] handle locks it
//! for exactly one transaction, so transactions from different tasks never interleave.
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;

use super::sync_write::SyncWriteFrame;
use super::{Bus, ServoStatus};

pub struct SharedBus<'a, M: RawMutex, B> {
    bus: &'a Mutex<M, B>,
}

impl<'a, M: RawMutex, B> SharedBus<'a, M, B> {
    pub fn new(bus: &'a Mutex<M, B>) -> Self {
        Self { bus }
    }
}

impl<M: RawMutex, B> Clone for SharedBus<'_, M, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, B> Copy for SharedBus<'_, M, B> {}

impl<M: RawMutex, B: Bus> Bus for SharedBus<'_, M, B> {
    type Error = B::Error;

    async fn read(&mut self, id: u8, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.lock().await.read(id, address, buf).await
    }

    async fn write(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
    ) -> Result<ServoStatus, Self::Error> {
        self.bus.lock().await.write(id, address, data).await
    }

    async fn sync_write(&mut self, frame: &SyncWriteFrame) -> Result<(), Self::Error> {
        self.bus.lock().await.sync_write(frame).await
    }
}
