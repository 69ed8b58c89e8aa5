// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Raw instruction encodings

use core::fmt;

use super::Size;

/// Bits from which instructions can be disassembled and classified
///
/// The two lowest bits of an encoding determine its length: `0b11` denotes a
/// 32bit instruction, anything else a 16bit ("compressed") one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bits {
    Bit16(u16),
    Bit32(u32),
}

impl Bits {
    /// Retrieve this instruction's [`Size`]
    pub fn size(self) -> Size {
        match self {
            Self::Bit16(_) => Size::Compressed,
            Self::Bit32(_) => Size::Normal,
        }
    }

    /// Retrieve the encoding as delivered by a retirement port
    pub fn raw(self) -> u32 {
        match self {
            Self::Bit16(v) => v.into(),
            Self::Bit32(v) => v,
        }
    }
}

impl Default for Bits {
    fn default() -> Self {
        Self::Bit32(0)
    }
}

/// Interpret a word as delivered by a retirement port
///
/// For 16bit instructions, the upper half of the word is ignored.
impl From<u32> for Bits {
    fn from(num: u32) -> Self {
        if num & 0b11 == 0b11 {
            Self::Bit32(num)
        } else {
            Self::Bit16(num as u16)
        }
    }
}

impl TryFrom<u16> for Bits {
    type Error = u16;

    fn try_from(num: u16) -> Result<Self, Self::Error> {
        if num & 0b11 != 0b11 {
            Ok(Self::Bit16(num))
        } else {
            Err(num)
        }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit16(v) => write!(f, "{v:04x}"),
            Self::Bit32(v) => write!(f, "{v:08x}"),
        }
    }
}
