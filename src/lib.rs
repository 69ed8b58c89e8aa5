// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

//! # Call stack and disassembly views of retired RISC-V instruction streams
//!
//! This crate monitors the instructions retired by a single RISC-V hart, e.g.
//! as reported by a co-simulation, and derives:
//!
//! - a live [disassembly][instruction::decode] of the current instruction,
//! - the call stack of the running program with symbolic function names and
//! - the [arguments][params] passed to the functions on that stack.
//!
//! This crate is not concerned with how the records of retired instructions
//! are transported. See [monitor] for the processing of those records,
//! [instruction] for the decoder and call/return classifier and [params] for
//! argument extraction.
//!
//! # Features
//! - RV32I and Zicsr disassembly as well as a few compressed instructions
//! - call and return detection following the RISC-V link register convention
//! - observers and [`Future`][core::future::Future]s for function entries and
//!   exits
//! - a display side-channel publishing text character by character
//! - symbol loading from ELF files (`elf` feature)
//!
//! # no_std
//! This crate is not dependent on the standard library and only uses the Core
//! and Alloc Libraries. It can therefore even be used in bare metal
//! environments.
//!
//! # Example
//!
//! The following example demonstrates feeding retired instructions to a
//! [`Monitor`][monitor::Monitor] and waiting for a function to be entered.
//!
//! ```
//! use core::future::Future;
//! use core::pin::pin;
//! use core::task::{Context, Poll, Waker};
//!
//! use riscv_debug_monitor::monitor;
//! use riscv_debug_monitor::params::Params;
//! use riscv_debug_monitor::symbols::SymbolTable;
//!
//! let symbols: SymbolTable = [(0x100, "main"), (0x200, "helper")].into_iter().collect();
//! let mut monitor: monitor::Monitor = monitor::builder()
//!     .with_symbols(symbols)
//!     .build();
//! let mut helper = pin!(monitor.on_entry(["helper"]).unwrap());
//!
//! monitor.write_reg(10, 42);
//! for (pc, insn) in [(0x100, 0x100000ef), (0x200, 0x00008067), (0x104, 0x00000013)] {
//!     monitor.retire(pc, insn);
//!     let mut cx = Context::from_waker(Waker::noop());
//!     if let Poll::Ready(frame) = helper.as_mut().poll(&mut cx) {
//!         let mut params = frame.params(riscv_debug_monitor::memory::Empty, Default::default());
//!         assert_eq!(params.next_u32(), Ok(42));
//!         println!("{} entered from {:#x}", frame.name, frame.return_addr - 4);
//!     }
//! }
//! assert_eq!(monitor.depth(), 0);
//! ```
#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod instruction;
pub mod memory;
pub mod monitor;
pub mod params;
pub mod registers;
pub mod stack;
pub mod symbols;

pub use error::Error;
pub use monitor::Monitor;
