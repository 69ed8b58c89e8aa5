// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Configuration and utilities

#[cfg(feature = "serde")]
mod serde_utils;


/// Monitor configuration
///
/// A monitor configuration defines the dimensions of the display side-channel
/// as well as target properties relevant for parameter extraction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Width of every text field of the display side-channel in characters
    pub msg_size: usize,
    /// Number of display slots for call stack frames
    pub window_size: usize,
    /// Address width of the monitored hart
    #[cfg_attr(feature = "serde", serde(with = "serde_utils::Width"))]
    pub address_width: AddressWidth,
    /// Initial [`TraceLevel`]
    pub trace_level: TraceLevel,
}

/// See [CONFIG] for default values of individual fields
impl Default for Config {
    fn default() -> Self {
        CONFIG
    }
}

/// Default [Config]
pub const CONFIG: Config = Config {
    msg_size: 64,
    window_size: 8,
    address_width: AddressWidth::Bits32,
    trace_level: TraceLevel::Calls,
};

/// Address width of the monitored hart
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AddressWidth {
    #[default]
    Bits32,
    Bits64,
}

impl AddressWidth {
    /// Retrieve the width in bits
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// Retrieve the width in bytes
    pub const fn bytes(self) -> u8 {
        self.bits() / 8
    }
}

/// Level of detail reported through the display side-channel
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TraceLevel {
    /// Only calls and returns are reported
    #[default]
    Calls,
    /// Calls, returns and other jumps are reported
    Jumps,
    /// Every retired instruction is disassembled
    All,
}

impl TraceLevel {
    /// Create a trace level from its numerical representation
    ///
    /// Returns [`None`] for values other than `0`, `1` and `2`.
    pub const fn from_int(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Calls),
            1 => Some(Self::Jumps),
            2 => Some(Self::All),
            _ => None,
        }
    }
}

impl From<TraceLevel> for u8 {
    fn from(level: TraceLevel) -> Self {
        match level {
            TraceLevel::Calls => 0,
            TraceLevel::Jumps => 1,
            TraceLevel::All => 2,
        }
    }
}
