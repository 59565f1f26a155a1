//! Little-endian encoding of control-table values.

/// Width of a control-table register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWidth {
    Byte = 1,
    Word = 2,
}

impl RegisterWidth {
    pub const fn size(self) -> usize {
        self as usize
    }
}

pub const fn encode_word(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Decodes the first `width` bytes of `bytes` as an unsigned little-endian value.
pub const fn decode(width: RegisterWidth, bytes: [u8; 2]) -> u16 {
    match width {
        RegisterWidth::Byte => bytes[0] as u16,
        RegisterWidth::Word => u16::from_le_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        assert_eq!(encode_word(300), [0x2C, 0x01]);
        assert_eq!(encode_word(1023), [0xFF, 0x03]);
        assert_eq!(decode(RegisterWidth::Word, [0x00, 0x02]), 512);
    }

    #[test]
    fn byte_decode_ignores_high_byte() {
        assert_eq!(decode(RegisterWidth::Byte, [0x2A, 0xFF]), 42);
        assert_eq!(RegisterWidth::Byte.size(), 1);
        assert_eq!(RegisterWidth::Word.size(), 2);
    }
}
