//! Protocol 1.0 packets.
//!
//! Instruction: `FF FF id len inst params.. chk`, status: `FF FF id len err params.. chk`.
//! `len` counts the bytes that follow it and `chk` is the inverted low byte of the sum of
//! every byte between the header and the checksum.
use core::fmt::{self, Display, Formatter};

use heapless::Vec;

use super::ServoStatus;

pub const HEADER: [u8; 2] = [0xFF, 0xFF];
/// Largest parameter block a length byte can describe.
pub const MAX_PARAMS: usize = u8::MAX as usize - 2;
pub const MAX_PACKET_LEN: usize = HEADER.len() + 2 + u8::MAX as usize;
/// Header, id and length: the part of a status packet read before its length is known.
pub const STATUS_PREFIX_LEN: usize = HEADER.len() + 2;

pub type Packet = Vec<u8, MAX_PACKET_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    TooLarge { params: usize },
    BadHeader,
    BadLength(u8),
    Truncated,
    Checksum { expected: u8, actual: u8 },
}

impl Display for PacketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::TooLarge { params } => {
                write!(f, "{params} parameter bytes do not fit in one packet")
            }
            PacketError::BadHeader => f.write_str("missing 0xFF 0xFF header"),
            PacketError::BadLength(len) => write!(f, "invalid length byte {len}"),
            PacketError::Truncated => f.write_str("truncated packet"),
            PacketError::Checksum { expected, actual } => {
                write!(f, "checksum mismatch: expected {expected:#04x}, got {actual:#04x}")
            }
        }
    }
}

pub fn checksum(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Builds an instruction packet addressed to `id`.
pub fn instruction(id: u8, instruction: u8, params: &[u8]) -> Result<Packet, PacketError> {
    let too_large = |_| PacketError::TooLarge {
        params: params.len(),
    };
    if params.len() > MAX_PARAMS {
        return Err(too_large(()));
    }
    let length = (params.len() + 2) as u8;

    let mut packet = Packet::new();
    packet.extend_from_slice(&HEADER).map_err(too_large)?;
    packet
        .extend_from_slice(&[id, length, instruction])
        .map_err(too_large)?;
    packet.extend_from_slice(params).map_err(too_large)?;
    let chk = checksum(&packet[HEADER.len()..]);
    packet.extend_from_slice(&[chk]).map_err(too_large)?;
    Ok(packet)
}

/// A status packet borrowed from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPacket<'a> {
    pub id: u8,
    pub status: ServoStatus,
    pub params: &'a [u8],
}

impl<'a> StatusPacket<'a> {
    /// Parses one status packet, header through checksum. Trailing bytes are ignored.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, PacketError> {
        if bytes.len() < STATUS_PREFIX_LEN {
            return Err(PacketError::Truncated);
        }
        if bytes[..HEADER.len()] != HEADER {
            return Err(PacketError::BadHeader);
        }
        let length = bytes[3];
        if length < 2 {
            return Err(PacketError::BadLength(length));
        }
        let end = STATUS_PREFIX_LEN + length as usize;
        if bytes.len() < end {
            return Err(PacketError::Truncated);
        }

        let expected = checksum(&bytes[HEADER.len()..end - 1]);
        let actual = bytes[end - 1];
        if expected != actual {
            return Err(PacketError::Checksum { expected, actual });
        }

        Ok(Self {
            id: bytes[2],
            status: ServoStatus::from_bits(bytes[4]),
            params: &bytes[STATUS_PREFIX_LEN + 1..end - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GOAL_POSITION, INST_READ};

    #[test]
    fn ping_matches_reference_packet() {
        let packet = instruction(1, 0x01, &[]).unwrap();
        assert_eq!(packet.as_slice(), &[0xFF, 0xFF, 0x01, 0x02, 0x01, 0xFB]);
    }

    #[test]
    fn read_instruction_layout() {
        let packet = instruction(3, INST_READ, &[GOAL_POSITION, 2]).unwrap();
        assert_eq!(
            packet.as_slice(),
            &[0xFF, 0xFF, 0x03, 0x04, 0x02, 0x1E, 0x02, 0xD6]
        );
    }

    #[test]
    fn oversized_parameter_block_is_rejected() {
        let params = [0u8; MAX_PARAMS + 1];
        assert_eq!(
            instruction(1, 0x03, &params),
            Err(PacketError::TooLarge {
                params: MAX_PARAMS + 1
            })
        );
        assert!(instruction(1, 0x03, &params[..MAX_PARAMS]).is_ok());
    }

    #[test]
    fn parses_status_with_payload() {
        let bytes = [0xFF, 0xFF, 0x03, 0x04, 0x00, 0x00, 0x02, 0xF6];
        let status = StatusPacket::parse(&bytes).unwrap();
        assert_eq!(status.id, 3);
        assert!(status.status.is_ok());
        assert_eq!(status.params, &[0x00, 0x02]);
    }

    #[test]
    fn parses_alarm_bits() {
        let mut bytes = [0xFF, 0xFF, 0x07, 0x02, ServoStatus::OVERLOAD, 0x00];
        bytes[5] = checksum(&bytes[2..5]);
        let status = StatusPacket::parse(&bytes).unwrap();
        assert!(status.status.contains(ServoStatus::OVERLOAD));
        assert!(status.params.is_empty());
    }

    #[test]
    fn rejects_corrupted_status() {
        let bytes = [0xFF, 0xFF, 0x03, 0x04, 0x00, 0x00, 0x02, 0x00];
        assert_eq!(
            StatusPacket::parse(&bytes),
            Err(PacketError::Checksum {
                expected: 0xF6,
                actual: 0x00
            })
        );
        assert_eq!(
            StatusPacket::parse(&[0xFF, 0x00, 0x03, 0x02, 0x00, 0xFA]),
            Err(PacketError::BadHeader)
        );
        assert_eq!(
            StatusPacket::parse(&[0xFF, 0xFF, 0x03, 0x04, 0x00]),
            Err(PacketError::Truncated)
        );
    }
}
