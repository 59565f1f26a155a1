//! Host doubles for the bus and the clock.
#![allow(dead_code)]

use std::collections::HashMap;

use ax_controller::bus::sync_write::SyncWriteFrame;
use ax_controller::bus::{Bus, ServoStatus};
use ax_controller::config::{ControllerConfig, DEFAULT_IDS};
use ax_controller::{Clock, Controller};
use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Read { id: u8, address: u8, len: usize },
    Write { id: u8, address: u8, data: Vec<u8> },
    SyncWrite { address: u8, entries: Vec<(u8, Vec<u8>)> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Bus that logs every transaction and keeps a register map per servo, so reads return
/// what earlier writes stored.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub transactions: Vec<Transaction>,
    pub registers: HashMap<(u8, u8), u8>,
    /// Fail the transaction with this index (0-based, counting every call).
    pub fail_at: Option<usize>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    pub fn set_word(&mut self, id: u8, address: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.registers.insert((id, address), lo);
        self.registers.insert((id, address + 1), hi);
    }

    pub fn word(&self, id: u8, address: u8) -> u16 {
        let lo = self.registers.get(&(id, address)).copied().unwrap_or(0);
        let hi = self.registers.get(&(id, address + 1)).copied().unwrap_or(0);
        u16::from_le_bytes([lo, hi])
    }

    pub fn sync_writes(&self) -> Vec<&Vec<(u8, Vec<u8>)>> {
        self.transactions
            .iter()
            .filter_map(|t| match t {
                Transaction::SyncWrite { entries, .. } => Some(entries),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, transaction: Transaction) -> Result<(), MockBusError> {
        let index = self.transactions.len();
        self.transactions.push(transaction);
        if self.fail_at == Some(index) {
            return Err(MockBusError);
        }
        Ok(())
    }

    fn store(&mut self, id: u8, address: u8, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            self.registers.insert((id, address + offset as u8), *byte);
        }
    }
}

impl Bus for RecordingBus {
    type Error = MockBusError;

    async fn read(&mut self, id: u8, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.record(Transaction::Read {
            id,
            address,
            len: buf.len(),
        })?;
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self
                .registers
                .get(&(id, address + offset as u8))
                .copied()
                .unwrap_or(0);
        }
        Ok(())
    }

    async fn write(
        &mut self,
        id: u8,
        address: u8,
        data: &[u8],
    ) -> Result<ServoStatus, Self::Error> {
        self.record(Transaction::Write {
            id,
            address,
            data: data.to_vec(),
        })?;
        self.store(id, address, data);
        Ok(ServoStatus::default())
    }

    async fn sync_write(&mut self, frame: &SyncWriteFrame) -> Result<(), Self::Error> {
        let entries: Vec<(u8, Vec<u8>)> = frame
            .entries()
            .map(|(id, data)| (id, data.to_vec()))
            .collect();
        self.record(Transaction::SyncWrite {
            address: frame.address(),
            entries: entries.clone(),
        })?;
        for (id, data) in &entries {
            self.store(*id, frame.address(), data);
        }
        Ok(())
    }
}

/// Clock that jumps straight to every deadline it is asked to wait for, then oversleeps
/// by `lag`.
#[derive(Debug)]
pub struct VirtualClock {
    pub now: Instant,
    pub waits: Vec<Instant>,
    pub lag: Duration,
}

impl VirtualClock {
    pub fn starting_at(millis: u64) -> Self {
        Self {
            now: Instant::from_millis(millis),
            waits: Vec::new(),
            lag: Duration::from_millis(0),
        }
    }

    pub fn with_lag(mut self, lag: Duration) -> Self {
        self.lag = lag;
        self
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.now
    }

    async fn wait_until(&mut self, deadline: Instant) {
        self.waits.push(deadline);
        if deadline > self.now {
            self.now = deadline;
        }
        self.now += self.lag;
    }
}

pub type TestController = Controller<RecordingBus, VirtualClock>;

/// Twelve servos at the default ids, clock at t = 1 s.
pub fn controller() -> TestController {
    controller_with(RecordingBus::new())
}

pub fn controller_with(bus: RecordingBus) -> TestController {
    Controller::new(
        bus,
        VirtualClock::starting_at(1000),
        &DEFAULT_IDS,
        ControllerConfig::default(),
    )
    .expect("default ids are valid")
}

/// Steps until the session ends, returning how many frames were written.
pub fn run_to_completion(controller: &mut TestController) -> usize {
    let mut frames = 0;
    while controller.is_interpolating() {
        embassy_futures::block_on(controller.interpolate_step()).expect("mock bus never fails");
        frames += 1;
        assert!(frames < 10_000, "interpolation did not converge");
    }
    frames
}
