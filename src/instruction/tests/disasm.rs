// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Disassembly tests

use super::*;

macro_rules! disasm_test {
    ($n:ident, $pc:literal, $l:literal, $s:literal) => {
        #[test]
        fn $n() {
            assert_eq!(decode($pc, $l), $s);
        }
    };
    ($n:ident, $l:literal, $s:literal) => {
        disasm_test!($n, 0x100, $l, $s);
    };
}

// U
disasm_test!(lui, 0x12345537, "lui a0,0x12345");
disasm_test!(auipc, 0x00001297, "auipc t0,0x00001100");
disasm_test!(auipc_neg, 0x1000, 0xfffff297, "auipc t0,0x00000000");
disasm_test!(auipc_wrap, 0x0, 0xfffff297, "auipc t0,0xfffff000");

// J
disasm_test!(jal, 0x100000ef, "jal ra,0x00000200");
disasm_test!(jal_t0, 0x100002ef, "jal t0,0x00000200");
disasm_test!(j, 0xff9ff06f, "j 0x000000f8");

// I (jumps)
disasm_test!(jalr_ret, 0x00008067, "jalr (ra)");
disasm_test!(jalr_call, 0x000780e7, "jalr ra,(a5)");
disasm_test!(jalr_offset, 0xffc30067, "jalr -4(t1)");
disasm_test!(jalr_call_offset, 0x010300e7, "jalr ra,16(t1)");
disasm_test!(jalr_funct3, 0x010310e7, "ill");

// B
disasm_test!(beq, 0x00b50463, "beq a0,a1,0x0108");
disasm_test!(bne, 0xfe0418e3, "bne s0,zero,0x00f0");
disasm_test!(blt, 0x02b54063, "blt a0,a1,0x0120");
disasm_test!(bge, 0x02b55063, "bge a0,a1,0x0120");
disasm_test!(bltu, 0x02b56063, "bltu a0,a1,0x0120");
disasm_test!(bgeu, 0x02b57063, "bgeu a0,a1,0x0120");
disasm_test!(beq_high, 0x80000000, 0x00b50463, "beq a0,a1,0x80000008");
disasm_test!(branch_funct3, 0x02b52063, "ill");

// Loads
disasm_test!(lb, 0xfff10503, "lb a0,-1(sp)");
disasm_test!(lh, 0x00211503, "lh a0,2(sp)");
disasm_test!(lw, 0x00812503, "lw a0,8(sp)");
disasm_test!(lbu, 0x00314503, "lbu a0,3(sp)");
disasm_test!(lhu, 0x00415503, "lhu a0,4(sp)");
disasm_test!(load_funct3, 0x00413503, "ill");

// Stores
disasm_test!(sb, 0xfeb40ea3, "sb a1,-3(s0)");
disasm_test!(sh, 0x00b41323, "sh a1,6(s0)");
disasm_test!(sw, 0x00112623, "sw ra,12(sp)");
disasm_test!(store_funct3, 0x00113623, "ill");

// Immediate arithmetic
disasm_test!(addi, 0x00550513, "addi a0,a0,5");
disasm_test!(addi_neg, 0xff010113, "addi sp,sp,-16");
disasm_test!(nop, 0x00000013, "nop");
disasm_test!(li, 0xfff00513, "li a0,-1");
disasm_test!(slli, 0x00351513, "slli a0,a0,3");
disasm_test!(slti, 0xfff5a513, "slti a0,a1,-1");
disasm_test!(sltiu, 0xfff5b513, "sltiu a0,a1,4095");
disasm_test!(xori, 0xfff5c513, "xori a0,a1,4095");
disasm_test!(srli, 0x0045d513, "srli a0,a1,4");
// `srai` shares `srli`'s funct3, the raw immediate includes bit 30
disasm_test!(srai, 0x4045d513, "srli a0,a1,1028");
disasm_test!(ori, 0x0ff5e513, "ori a0,a1,255");
disasm_test!(andi, 0x0ff5f513, "andi a0,a1,255");

// Register arithmetic
disasm_test!(add, 0x00c58533, "add a0,a1,a2");
disasm_test!(sub, 0x40c58533, "sub a0,a1,a2");
disasm_test!(sll, 0x00c59533, "sll a0,a1,a2");
disasm_test!(slt, 0x00c5a533, "slt a0,a1,a2");
disasm_test!(sltu, 0x00c5b533, "sltu a0,a1,a2");
disasm_test!(xor, 0x00c5c533, "xor a0,a1,a2");
disasm_test!(srl, 0x00c5d533, "srl a0,a1,a2");
disasm_test!(sra, 0x40c5d533, "sra a0,a1,a2");
disasm_test!(or, 0x00c5e533, "or a0,a1,a2");
disasm_test!(and, 0x00c5f533, "and a0,a1,a2");
disasm_test!(op_bit30, 0x40c59533, "ill");

// MISC-MEM and SYSTEM
disasm_test!(fence, 0x0ff0000f, "fence");
disasm_test!(fence_i, 0x0000100f, "fence.i");
disasm_test!(ecall, 0x00000073, "ecall");
disasm_test!(ebreak, 0x00100073, "ebreak");
disasm_test!(csrrw, 0x30059573, "csrrw a0,a1");
disasm_test!(csrrs, 0xf1402573, "csrrs a0,zero");
disasm_test!(csrrc, 0x3005b573, "csrrc a0,a1");
disasm_test!(csrrwi, 0x3001d573, "csrrwi a0,gp");
disasm_test!(csrrsi, 0x3001e573, "csrrsi a0,gp");
disasm_test!(csrrci, 0x3001f573, "csrrci a0,gp");
disasm_test!(csr_funct3, 0x3001c573, "ill");

disasm_test!(unknown_opcode, 0x0000000b, "ill");

// Compressed
disasm_test!(c_nop, 0x00000001, "c.nop");
disasm_test!(c_addi, 0x00000505, "c.addi a0,1");
disasm_test!(c_addi_unsigned, 0x0000157d, "c.addi a0,63");
disasm_test!(c_li, 0x0000478d, "c.li a5,3");
disasm_test!(c_li_unsigned, 0x000057f9, "c.li a5,62");
disasm_test!(c_quadrant0, 0x00000040, "ill");
disasm_test!(c_jal, 0x00002041, "ill");
disasm_test!(c_ret, 0x00008082, "ill");
disasm_test!(c_slli, 0x00000506, "ill");
disasm_test!(c_upper_half_ignored, 0xffff0505, "c.addi a0,1");

#[test]
fn disassembly_kind() {
    assert_eq!(
        Disassembly::new(0, 0x00550513).kind(),
        Some(Kind::addi(format::TypeI {
            rd: 10,
            rs1: 10,
            imm: 5,
        })),
    );
    assert_eq!(Disassembly::new(0, 0x0000000b).kind(), None);
    assert_eq!(Disassembly::new(0, Bits::Bit16(0x0040)).kind(), None);
}
