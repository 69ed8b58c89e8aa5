// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! General purpose registers

use crate::instruction::format::Register;

/// ABI names of the general purpose registers `x0` to `x31`
pub const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// First integer argument register, `a0`
pub const FIRST_ARG: Register = 10;

/// Number of integer argument registers, `a0` to `a7`
pub const ARG_COUNT: u8 = 8;

/// Stack pointer, `sp`
pub const SP: Register = 2;

/// Retrieve the ABI name of a register
///
/// Only the lower five bits of `reg` are considered.
pub fn abi_name(reg: Register) -> &'static str {
    ABI_NAMES[usize::from(reg & 0x1f)]
}

/// Values of the 32 general purpose registers of an RV32 hart
///
/// Registers are addressed by their number. Only the lower five bits of a
/// register number are considered. No special meaning is attached to `x0`:
/// it reads whatever was last written to it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers([u32; 32]);

impl Registers {
    /// Retrieve the value of a single register
    pub fn get(&self, reg: Register) -> u32 {
        self.0[usize::from(reg & 0x1f)]
    }

    /// Set the value of a single register
    pub fn set(&mut self, reg: Register, value: u32) {
        self.0[usize::from(reg & 0x1f)] = value;
    }

    /// Retrieve the stack pointer
    pub fn sp(&self) -> u32 {
        self.get(SP)
    }
}

impl From<[u32; 32]> for Registers {
    fn from(values: [u32; 32]) -> Self {
        Self(values)
    }
}
