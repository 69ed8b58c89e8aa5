// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Execution events consumed and produced by the [`Monitor`][super::Monitor]

/// A single retired instruction
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Retired {
    /// Address of the instruction
    pub pc: u32,
    /// Raw encoding of the instruction
    ///
    /// For compressed instructions, only the lower 16 bits are relevant.
    pub insn: u32,
}

impl Retired {
    /// Create a new retired instruction
    pub const fn new(pc: u32, insn: u32) -> Self {
        Self { pc, insn }
    }
}

impl From<(u32, u32)> for Retired {
    fn from((pc, insn): (u32, u32)) -> Self {
        Self { pc, insn }
    }
}

/// A memory write performed by a retired instruction
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemWrite {
    /// Word address
    pub addr: u32,
    /// Data written
    pub data: u32,
    /// Byte enable mask
    pub mask: u8,
}

/// Execution event record
///
/// One such record is delivered for every retired instruction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecEvent {
    /// The instruction retired before [`current`][Self::current]
    ///
    /// If absent, the [`Monitor`][super::Monitor] uses the instruction of the
    /// last event it received.
    pub previous: Option<Retired>,
    /// The instruction being retired
    pub current: Retired,
    /// Whether [`current`][Self::current] was reached through a trap
    pub interrupt: bool,
    /// Memory write performed by [`current`][Self::current], if any
    pub write: Option<MemWrite>,
}

impl ExecEvent {
    /// Create a record for a single retired instruction
    pub fn new(pc: u32, insn: u32) -> Self {
        Self {
            current: Retired::new(pc, insn),
            ..Default::default()
        }
    }

    /// Set the previously retired instruction
    pub fn with_previous(self, pc: u32, insn: u32) -> Self {
        Self {
            previous: Some(Retired::new(pc, insn)),
            ..self
        }
    }

    /// Mark the instruction as reached through a trap
    pub fn with_interrupt(self, interrupt: bool) -> Self {
        Self { interrupt, ..self }
    }

    /// Set the memory write
    pub fn with_write(self, write: MemWrite) -> Self {
        Self {
            write: Some(write),
            ..self
        }
    }
}

/// Control flow event detected by the [`Monitor`][super::Monitor]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A function was called
    Call {
        /// Address of the called function
        target: u64,
        /// Address execution will return to
        return_addr: u64,
        /// The calling instruction
        insn: Retired,
    },
    /// A function returned
    Return {
        /// Address execution returned to
        target: u64,
        /// The returning instruction
        insn: Retired,
    },
}
