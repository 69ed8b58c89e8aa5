// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! RISC-V instruction decoding, disassembly and classification
//!
//! This module provides the [`Kind`] of an RV32 instruction decoded from raw
//! [`Bits`], a [`Disassembly`] rendering it as text and the [`classify`] fn
//! determining whether an instruction transfers control as a call or return.
//!
//! # Example
//!
//! ```
//! use riscv_debug_monitor::instruction;
//!
//! assert_eq!(instruction::decode(0x100, 0x00550513), "addi a0,a0,5");
//! assert_eq!(instruction::decode(0x100, 0x100000ef), "jal ra,0x00000200");
//! assert!(instruction::classify(0x100000ef).call);
//! ```

pub mod bits;
pub mod disasm;
pub mod format;
pub mod transfer;


pub use bits::Bits;
pub use disasm::{Disassembly, decode};
pub use transfer::{Transfer, classify};

use OpCode::*;

#[repr(u32)]
#[derive(Eq, PartialEq)]
enum OpCode {
    Load = 0b0000011,
    MiscMem = 0b0001111,
    OpImm = 0b0010011,
    Auipc = 0b0010111,
    Store = 0b0100011,
    Op = 0b0110011,
    Lui = 0b0110111,
    Branch = 0b1100011,
    Jalr = 0b1100111,
    Jal = 0b1101111,
    System = 0b1110011,
    Ignored,
}

impl From<u32> for OpCode {
    fn from(value: u32) -> Self {
        const MASK: u32 = 0x7F;
        match value & MASK {
            x if x == Load as u32 => Load,
            x if x == MiscMem as u32 => MiscMem,
            x if x == OpImm as u32 => OpImm,
            x if x == Auipc as u32 => Auipc,
            x if x == Store as u32 => Store,
            x if x == Op as u32 => Op,
            x if x == Lui as u32 => Lui,
            x if x == Branch as u32 => Branch,
            x if x == Jalr as u32 => Jalr,
            x if x == Jal as u32 => Jal,
            x if x == System as u32 => System,
            _ => Ignored,
        }
    }
}

/// Instructions known to the disassembler
///
/// Only the RV32I base set, `Zifencei`, `Zicsr` and a few compressed
/// instructions are covered. Anything else is not decoded and will be
/// displayed as `ill`.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    // U
    lui(format::TypeU),
    auipc(format::TypeU),
    // J
    jal(format::TypeJ),
    // I
    jalr(format::TypeI),
    // B
    beq(format::TypeB),
    bne(format::TypeB),
    blt(format::TypeB),
    bge(format::TypeB),
    bltu(format::TypeB),
    bgeu(format::TypeB),
    // I (loads)
    lb(format::TypeI),
    lh(format::TypeI),
    lw(format::TypeI),
    lbu(format::TypeI),
    lhu(format::TypeI),
    // S
    sb(format::TypeS),
    sh(format::TypeS),
    sw(format::TypeS),
    // I (arithmetic)
    addi(format::TypeI),
    slli(format::TypeI),
    slti(format::TypeI),
    sltiu(format::TypeI),
    xori(format::TypeI),
    srli(format::TypeI),
    ori(format::TypeI),
    andi(format::TypeI),
    // R
    add(format::TypeR),
    sub(format::TypeR),
    sll(format::TypeR),
    slt(format::TypeR),
    sltu(format::TypeR),
    xor(format::TypeR),
    srl(format::TypeR),
    sra(format::TypeR),
    or(format::TypeR),
    and(format::TypeR),
    // MISC-MEM
    fence,
    fence_i,
    // SYSTEM
    ecall,
    ebreak,
    csrrw(format::TypeR),
    csrrs(format::TypeR),
    csrrc(format::TypeR),
    csrrwi(format::TypeR),
    csrrsi(format::TypeR),
    csrrci(format::TypeR),
    // CI
    c_nop,
    c_addi(format::TypeCI),
    c_li(format::TypeCI),
}

impl Kind {
    /// Decode a 32bit ("normal") instruction
    ///
    /// Returns `None` if the instruction is not known.
    pub fn decode_32(insn: u32) -> Option<Self> {
        let funct3 = (insn >> 12) & 0x7;

        match OpCode::from(insn) {
            Lui => Some(Self::lui(insn.into())),
            Auipc => Some(Self::auipc(insn.into())),
            Jal => Some(Self::jal(insn.into())),
            Jalr => (funct3 == 0).then(|| Self::jalr(insn.into())),
            Branch => match funct3 {
                0b000 => Some(Self::beq(insn.into())),
                0b001 => Some(Self::bne(insn.into())),
                0b100 => Some(Self::blt(insn.into())),
                0b101 => Some(Self::bge(insn.into())),
                0b110 => Some(Self::bltu(insn.into())),
                0b111 => Some(Self::bgeu(insn.into())),
                _ => None,
            },
            Load => match funct3 {
                0b000 => Some(Self::lb(insn.into())),
                0b001 => Some(Self::lh(insn.into())),
                0b010 => Some(Self::lw(insn.into())),
                0b100 => Some(Self::lbu(insn.into())),
                0b101 => Some(Self::lhu(insn.into())),
                _ => None,
            },
            Store => match funct3 {
                0b000 => Some(Self::sb(insn.into())),
                0b001 => Some(Self::sh(insn.into())),
                0b010 => Some(Self::sw(insn.into())),
                _ => None,
            },
            OpImm => Some(match funct3 {
                0b000 => Self::addi(insn.into()),
                0b001 => Self::slli(insn.into()),
                0b010 => Self::slti(insn.into()),
                0b011 => Self::sltiu(insn.into()),
                0b100 => Self::xori(insn.into()),
                0b101 => Self::srli(insn.into()),
                0b110 => Self::ori(insn.into()),
                _ => Self::andi(insn.into()),
            }),
            Op if insn & 0x4000_0000 == 0 => Some(match funct3 {
                0b000 => Self::add(insn.into()),
                0b001 => Self::sll(insn.into()),
                0b010 => Self::slt(insn.into()),
                0b011 => Self::sltu(insn.into()),
                0b100 => Self::xor(insn.into()),
                0b101 => Self::srl(insn.into()),
                0b110 => Self::or(insn.into()),
                _ => Self::and(insn.into()),
            }),
            Op => match funct3 {
                0b000 => Some(Self::sub(insn.into())),
                0b101 => Some(Self::sra(insn.into())),
                _ => None,
            },
            MiscMem if insn & 0x1000 == 0 => Some(Self::fence),
            MiscMem => Some(Self::fence_i),
            System => match funct3 {
                0b000 if insn & 0x0010_0000 == 0 => Some(Self::ecall),
                0b000 => Some(Self::ebreak),
                0b001 => Some(Self::csrrw(insn.into())),
                0b010 => Some(Self::csrrs(insn.into())),
                0b011 => Some(Self::csrrc(insn.into())),
                0b101 => Some(Self::csrrwi(insn.into())),
                0b110 => Some(Self::csrrsi(insn.into())),
                0b111 => Some(Self::csrrci(insn.into())),
                _ => None,
            },
            Ignored => None,
        }
    }

    /// Decode a 16bit ("compressed") instruction
    ///
    /// Returns `None` if the instruction is not known.
    pub fn decode_16(insn: u16) -> Option<Self> {
        let op = insn & 0x3;
        let funct3 = insn >> 13;
        match (op, funct3) {
            (0b01, 0b000) => {
                let data = format::TypeCI::from(insn);
                if data.rd == 0 {
                    Some(Self::c_nop)
                } else {
                    Some(Self::c_addi(data))
                }
            }
            (0b01, 0b010) => Some(Self::c_li(insn.into())),
            _ => None,
        }
    }

    /// Decode instruction [`Bits`]
    pub fn decode(bits: Bits) -> Option<Self> {
        match bits {
            Bits::Bit16(bits) => Self::decode_16(bits),
            Bits::Bit32(bits) => Self::decode_32(bits),
        }
    }
}

/// Represents the possible byte length of single RISC-V instruction.
/// It is either 4 or 2 bytes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Size {
    Compressed = 2,
    #[default]
    Normal = 4,
}

impl Size {
    /// Distance from an instruction's address to the next sequential one
    pub fn fallthrough(self) -> u32 {
        self as u32
    }
}
