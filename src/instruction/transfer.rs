// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Call and return classification

use super::format::{self, Register};
use super::{Bits, Size};

/// Registers considered link registers, `ra` and `t0`
pub const LINK_REGISTERS: [Register; 2] = [1, 5];

/// Determine whether a register is a link register
pub fn is_link(reg: Register) -> bool {
    LINK_REGISTERS.contains(&reg)
}

/// Control transfer classification of a single instruction
///
/// An instruction may be classified as both call and return, e.g. a `jalr`
/// with `ra` as source and `t0` as destination (a coroutine switch).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    /// The instruction can be considered a function call
    pub call: bool,
    /// The instruction can be considered a function return
    pub ret: bool,
    /// The instruction's size
    pub size: Size,
}

impl Transfer {
    /// Determine whether the instruction is both a call and a return
    pub fn is_ambiguous(&self) -> bool {
        self.call && self.ret
    }

    /// Distance from the instruction's address to its return site
    pub fn fallthrough(&self) -> u32 {
        self.size.fallthrough()
    }
}

/// Classify a single instruction given as a word from a retirement port
///
/// `jal` and `jalr` are classified based on the link register convention in
/// Table 2.1 of The RISC-V Instruction Set Manual Volume I. In addition,
/// `c.jr` through a link register is considered a return. `c.jal` and
/// `c.jalr` are currently not classified.
pub fn classify(raw: u32) -> Transfer {
    let bits = Bits::from(raw);
    let (call, ret) = match bits {
        Bits::Bit32(insn) => classify_32(insn),
        Bits::Bit16(insn) => classify_16(insn),
    };
    Transfer {
        call,
        ret,
        size: bits.size(),
    }
}

fn classify_32(insn: u32) -> (bool, bool) {
    match insn & 0x7f {
        0b1100111 if (insn >> 12) & 0x7 == 0 => {
            let format::TypeI { rd, rs1, .. } = insn.into();
            match (is_link(rd), is_link(rs1)) {
                (false, true) => (false, true),
                (true, false) => (true, false),
                (true, true) => (true, rd != rs1),
                (false, false) => (false, false),
            }
        }
        0b1101111 => (is_link(format::TypeJ::from(insn).rd), false),
        _ => (false, false),
    }
}

fn classify_16(insn: u16) -> (bool, bool) {
    let op = insn & 0x3;
    let funct3 = insn >> 13;
    match (op, funct3) {
        (0b01, 0b001) => {
            log::debug!("c.jal {insn:04x} is not classified");
            (false, false)
        }
        (0b10, 0b100) => {
            let data = format::TypeR::from(insn);
            let bit12 = (insn >> 12) & 0x1;
            match (bit12, data.rs1, data.rs2) {
                (0, r, 0) if r != 0 => (false, is_link(r)),
                (1, r, 0) if r != 0 => {
                    log::debug!("c.jalr {insn:04x} is not classified");
                    (false, false)
                }
                _ => (false, false),
            }
        }
        _ => (false, false),
    }
}
