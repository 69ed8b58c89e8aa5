// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Textual disassembly

use alloc::string::{String, ToString};
use core::fmt;

use crate::registers::abi_name as reg;

use super::{Bits, Kind, format};

/// Disassemble a single instruction
///
/// The instruction is given as a word `raw` as delivered by a retirement port,
/// retired at `pc`. Instructions not known to the disassembler are rendered as
/// `ill`, which never is an error.
pub fn decode(pc: u32, raw: u32) -> String {
    Disassembly::new(pc, raw).to_string()
}

/// Textual representation of an instruction at a specific address
///
/// Jump and branch targets as well as `auipc` results are displayed as
/// absolute addresses, which is why the address needs to be known.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Disassembly {
    pc: u32,
    kind: Option<Kind>,
}

impl Disassembly {
    /// Create a new disassembly for an instruction retired at `pc`
    pub fn new(pc: u32, bits: impl Into<Bits>) -> Self {
        Self {
            pc,
            kind: Kind::decode(bits.into()),
        }
    }

    /// Retrieve the decoded [`Kind`], if the instruction is known
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    fn target(&self, offset: i32) -> u32 {
        self.pc.wrapping_add_signed(offset)
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(kind) = self.kind else {
            return write!(f, "ill");
        };
        match kind {
            Kind::lui(d) => write!(f, "lui {},0x{:05x}", reg(d.rd), d.upper()),
            Kind::auipc(d) => write!(f, "auipc {},0x{:08x}", reg(d.rd), self.target(d.imm)),
            Kind::jal(format::TypeJ { rd: 0, imm }) => write!(f, "j 0x{:08x}", self.target(imm)),
            Kind::jal(d) => write!(f, "jal {},0x{:08x}", reg(d.rd), self.target(d.imm)),
            Kind::jalr(d) => {
                write!(f, "jalr ")?;
                if d.rd != 0 {
                    write!(f, "{},", reg(d.rd))?;
                }
                if d.imm != 0 {
                    write!(f, "{}", d.imm)?;
                }
                write!(f, "({})", reg(d.rs1))
            }
            Kind::beq(d) => branch(f, "beq", d, self.target(d.imm.into())),
            Kind::bne(d) => branch(f, "bne", d, self.target(d.imm.into())),
            Kind::blt(d) => branch(f, "blt", d, self.target(d.imm.into())),
            Kind::bge(d) => branch(f, "bge", d, self.target(d.imm.into())),
            Kind::bltu(d) => branch(f, "bltu", d, self.target(d.imm.into())),
            Kind::bgeu(d) => branch(f, "bgeu", d, self.target(d.imm.into())),
            Kind::lb(d) => load(f, "lb", d),
            Kind::lh(d) => load(f, "lh", d),
            Kind::lw(d) => load(f, "lw", d),
            Kind::lbu(d) => load(f, "lbu", d),
            Kind::lhu(d) => load(f, "lhu", d),
            Kind::sb(d) => store(f, "sb", d),
            Kind::sh(d) => store(f, "sh", d),
            Kind::sw(d) => store(f, "sw", d),
            Kind::addi(format::TypeI { rd: 0, rs1: 0, .. }) => write!(f, "nop"),
            Kind::addi(format::TypeI { rd, rs1: 0, imm }) => write!(f, "li {},{imm}", reg(rd)),
            Kind::addi(d) => write!(f, "addi {},{},{}", reg(d.rd), reg(d.rs1), d.imm),
            Kind::slti(d) => write!(f, "slti {},{},{}", reg(d.rd), reg(d.rs1), d.imm),
            Kind::slli(d) => unsigned_imm(f, "slli", d),
            Kind::sltiu(d) => unsigned_imm(f, "sltiu", d),
            Kind::xori(d) => unsigned_imm(f, "xori", d),
            Kind::srli(d) => unsigned_imm(f, "srli", d),
            Kind::ori(d) => unsigned_imm(f, "ori", d),
            Kind::andi(d) => unsigned_imm(f, "andi", d),
            Kind::add(d) => three_regs(f, "add", d),
            Kind::sub(d) => three_regs(f, "sub", d),
            Kind::sll(d) => three_regs(f, "sll", d),
            Kind::slt(d) => three_regs(f, "slt", d),
            Kind::sltu(d) => three_regs(f, "sltu", d),
            Kind::xor(d) => three_regs(f, "xor", d),
            Kind::srl(d) => three_regs(f, "srl", d),
            Kind::sra(d) => three_regs(f, "sra", d),
            Kind::or(d) => three_regs(f, "or", d),
            Kind::and(d) => three_regs(f, "and", d),
            Kind::fence => write!(f, "fence"),
            Kind::fence_i => write!(f, "fence.i"),
            Kind::ecall => write!(f, "ecall"),
            Kind::ebreak => write!(f, "ebreak"),
            Kind::csrrw(d) => csr(f, "csrrw", d),
            Kind::csrrs(d) => csr(f, "csrrs", d),
            Kind::csrrc(d) => csr(f, "csrrc", d),
            Kind::csrrwi(d) => csr(f, "csrrwi", d),
            Kind::csrrsi(d) => csr(f, "csrrsi", d),
            Kind::csrrci(d) => csr(f, "csrrci", d),
            Kind::c_nop => write!(f, "c.nop"),
            Kind::c_addi(d) => write!(f, "c.addi {},{}", reg(d.rd), d.imm),
            Kind::c_li(d) => write!(f, "c.li {},{}", reg(d.rd), d.imm),
        }
    }
}

fn branch(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeB, target: u32) -> fmt::Result {
    write!(f, "{op} {},{},0x{target:04x}", reg(d.rs1), reg(d.rs2))
}

fn load(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeI) -> fmt::Result {
    write!(f, "{op} {},{}({})", reg(d.rd), d.imm, reg(d.rs1))
}

fn store(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeS) -> fmt::Result {
    write!(f, "{op} {},{}({})", reg(d.rs2), d.imm, reg(d.rs1))
}

fn unsigned_imm(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeI) -> fmt::Result {
    write!(f, "{op} {},{},{}", reg(d.rd), reg(d.rs1), d.raw_imm())
}

fn three_regs(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeR) -> fmt::Result {
    write!(f, "{op} {},{},{}", reg(d.rd), reg(d.rs1), reg(d.rs2))
}

fn csr(f: &mut fmt::Formatter<'_>, op: &str, d: format::TypeR) -> fmt::Result {
    write!(f, "{op} {},{}", reg(d.rd), reg(d.rs1))
}
