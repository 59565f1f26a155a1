//! SYNC_WRITE frames.
//!
//! One SYNC_WRITE sets the same register on several servos in a single broadcast
//! transaction. The parameter block is `address, width, id0, data0.., id1, data1.., ...`.
use core::fmt::{self, Display, Formatter};

use heapless::Vec;

use super::codec::{encode_word, RegisterWidth};
use super::packet::MAX_PARAMS;
use crate::config::GOAL_POSITION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// `ids` and `payloads` are not order-correlated one to one.
    LengthMismatch { ids: usize, payloads: usize },
    Empty,
    /// Payload for `id` does not have the width of the first payload.
    UnevenPayload { id: u8 },
    TooLarge { params: usize },
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::LengthMismatch { ids, payloads } => {
                write!(f, "{ids} ids but {payloads} payloads")
            }
            ProtocolError::Empty => f.write_str("sync write without actuators"),
            ProtocolError::UnevenPayload { id } => {
                write!(f, "payload for servo {id} has a different width")
            }
            ProtocolError::TooLarge { params } => {
                write!(f, "{params} parameter bytes do not fit in one packet")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncWriteFrame {
    params: Vec<u8, MAX_PARAMS>,
}

impl SyncWriteFrame {
    /// Builds a frame writing `payloads[k]` at `address` of servo `ids[k]`.
    pub fn build<P: AsRef<[u8]>>(
        ids: &[u8],
        address: u8,
        payloads: &[P],
    ) -> Result<Self, ProtocolError> {
        if ids.len() != payloads.len() {
            return Err(ProtocolError::LengthMismatch {
                ids: ids.len(),
                payloads: payloads.len(),
            });
        }
        let width = payloads
            .first()
            .map(|p| p.as_ref().len())
            .ok_or(ProtocolError::Empty)?;

        let mut frame = Self::start(address, width, ids.len())?;
        for (&id, payload) in ids.iter().zip(payloads) {
            frame.push(id, payload.as_ref())?;
        }
        Ok(frame)
    }

    /// Goal-position frame: every position is sent as a 2-byte little-endian word.
    pub fn goal_positions(ids: &[u8], positions: &[u16]) -> Result<Self, ProtocolError> {
        if ids.len() != positions.len() {
            return Err(ProtocolError::LengthMismatch {
                ids: ids.len(),
                payloads: positions.len(),
            });
        }
        if ids.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let mut frame = Self::start(GOAL_POSITION, RegisterWidth::Word.size(), ids.len())?;
        for (&id, &position) in ids.iter().zip(positions) {
            frame.push(id, &encode_word(position))?;
        }
        Ok(frame)
    }

    fn start(address: u8, width: usize, count: usize) -> Result<Self, ProtocolError> {
        let params = 2 + count * (1 + width);
        if params > MAX_PARAMS {
            return Err(ProtocolError::TooLarge { params });
        }
        let mut frame = Self { params: Vec::new() };
        frame
            .params
            .extend_from_slice(&[address, width as u8])
            .map_err(|_| ProtocolError::TooLarge { params })?;
        Ok(frame)
    }

    fn push(&mut self, id: u8, data: &[u8]) -> Result<(), ProtocolError> {
        if data.len() != self.width() {
            return Err(ProtocolError::UnevenPayload { id });
        }
        let params = self.params.len() + 1 + data.len();
        self.params
            .push(id)
            .map_err(|_| ProtocolError::TooLarge { params })?;
        self.params
            .extend_from_slice(data)
            .map_err(|_| ProtocolError::TooLarge { params })
    }

    pub fn address(&self) -> u8 {
        self.params[0]
    }

    /// Payload bytes per servo.
    pub fn width(&self) -> usize {
        self.params[1] as usize
    }

    /// Number of servos addressed.
    pub fn len(&self) -> usize {
        (self.params.len() - 2) / (1 + self.width())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(id, payload)` pairs in the order they were given.
    pub fn entries(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.params[2..]
            .chunks_exact(1 + self.width())
            .map(|entry| (entry[0], &entry[1..]))
    }

    /// Wire parameter block of the SYNC_WRITE instruction.
    pub fn parameters(&self) -> &[u8] {
        &self.params
    }
}
