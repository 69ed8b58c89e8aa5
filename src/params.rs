// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Extraction of function arguments
//!
//! Following the RISC-V calling convention, the first eight integer arguments
//! of a function are passed in the registers `a0` to `a7`. This module
//! provides cursors over these arguments via the [`Params`] trait:
//!
//! * [`RegisterParams`] extracts arguments from a register snapshot, usually
//!   the one captured when a function was entered.
//! * [`VaParams`] extracts variadic arguments from memory, starting at the
//!   address passed as a `va_list`.
//!
//! Arguments are extracted in order. A cursor never moves backwards and a
//! failed extraction does not move it at all.
//!
//! # Example
//!
//! ```
//! use riscv_debug_monitor::config::AddressWidth;
//! use riscv_debug_monitor::memory::{self, Memory};
//! use riscv_debug_monitor::params::{Params, RegisterParams};
//! use riscv_debug_monitor::registers::Registers;
//!
//! let mut regs = Registers::default();
//! regs.set(10, 0x2000);
//! regs.set(11, (-5i32) as u32);
//!
//! let mem = memory::from_segment(b"hi\0").with_offset(0x2000);
//! let mut params = RegisterParams::new(regs, mem, AddressWidth::Bits32);
//! assert_eq!(params.next_str().unwrap(), "hi");
//! assert_eq!(params.next_i8(), Ok(-5));
//! ```

mod error;


pub use error::{Error, Unsupported};

use alloc::string::String;

use crate::config::AddressWidth;
use crate::memory::Memory;
use crate::registers::{self, Registers};

/// Maximum number of bytes read for a single string argument
pub const MAX_STR_LEN: usize = 1024;

/// Cursor over function arguments
pub trait Params {
    /// Error type returned by extractions
    type Error;

    /// Cursor type for variadic arguments
    type Va<'a>: Params<Error = Self::Error>
    where
        Self: 'a;

    /// Extract the next 8 bit unsigned argument
    fn next_u8(&mut self) -> Result<u8, Self::Error>;

    /// Extract the next 16 bit unsigned argument
    fn next_u16(&mut self) -> Result<u16, Self::Error>;

    /// Extract the next 32 bit unsigned argument
    fn next_u32(&mut self) -> Result<u32, Self::Error>;

    /// Extract the next 64 bit unsigned argument
    fn next_u64(&mut self) -> Result<u64, Self::Error>;

    /// Extract the next pointer argument
    fn next_ptr(&mut self) -> Result<u64, Self::Error>;

    /// Extract the next string, i.e. `const char *`, argument
    ///
    /// Bytes are read until a NUL byte is encountered or [`MAX_STR_LEN`] bytes
    /// were read. Every byte is mapped to the [`char`] of the same value.
    fn next_str(&mut self) -> Result<String, Self::Error>;

    /// Extract the next argument as a `va_list`
    fn next_va(&mut self) -> Result<Self::Va<'_>, Self::Error>;

    /// Extract the next 8 bit signed argument
    fn next_i8(&mut self) -> Result<i8, Self::Error> {
        self.next_u8().map(|v| v as i8)
    }

    /// Extract the next 16 bit signed argument
    fn next_i16(&mut self) -> Result<i16, Self::Error> {
        self.next_u16().map(|v| v as i16)
    }

    /// Extract the next 32 bit signed argument
    fn next_i32(&mut self) -> Result<i32, Self::Error> {
        self.next_u32().map(|v| v as i32)
    }

    /// Extract the next 64 bit signed argument
    fn next_i64(&mut self) -> Result<i64, Self::Error> {
        self.next_u64().map(|v| v as i64)
    }
}

/// [`Params`] passed in the argument registers `a0` to `a7`
///
/// Every extraction consumes one register, regardless of the width of the
/// argument. 64 bit arguments and arguments spilled to the stack are not
/// supported.
#[derive(Clone, Debug)]
pub struct RegisterParams<M> {
    registers: Registers,
    memory: M,
    width: AddressWidth,
    index: u8,
}

impl<M: Memory> RegisterParams<M> {
    /// Create a new cursor pointing to the first argument
    pub fn new(registers: Registers, memory: M, width: AddressWidth) -> Self {
        Self {
            registers,
            memory,
            width,
            index: 0,
        }
    }

    /// Retrieve the number of arguments extracted so far
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Retrieve the stack pointer captured with the registers
    pub fn sp(&self) -> u32 {
        self.registers.sp()
    }

    fn peek(&self) -> Result<u32, Error<M::Error>> {
        if self.index < registers::ARG_COUNT {
            Ok(self.registers.get(registers::FIRST_ARG + self.index))
        } else {
            Err(Unsupported::StackSpill.into())
        }
    }

    fn next_reg(&mut self) -> Result<u32, Error<M::Error>> {
        let value = self.peek()?;
        self.index += 1;
        Ok(value)
    }
}

impl<M: Memory> Params for RegisterParams<M> {
    type Error = Error<M::Error>;

    type Va<'a>
        = VaParams<&'a mut M>
    where
        Self: 'a;

    fn next_u8(&mut self) -> Result<u8, Self::Error> {
        self.next_reg().map(|v| v as u8)
    }

    fn next_u16(&mut self) -> Result<u16, Self::Error> {
        self.next_reg().map(|v| v as u16)
    }

    fn next_u32(&mut self) -> Result<u32, Self::Error> {
        self.next_reg()
    }

    fn next_u64(&mut self) -> Result<u64, Self::Error> {
        Err(Unsupported::Wide.into())
    }

    fn next_ptr(&mut self) -> Result<u64, Self::Error> {
        self.next_reg().map(u64::from)
    }

    fn next_str(&mut self) -> Result<String, Self::Error> {
        let address = self.peek()?.into();
        let res = read_str(&mut self.memory, address).map_err(Error::Memory)?;
        self.index += 1;
        Ok(res)
    }

    fn next_va(&mut self) -> Result<Self::Va<'_>, Self::Error> {
        let address = self.next_ptr()?;
        Ok(VaParams::new(address, &mut self.memory, self.width))
    }
}

/// [`Params`] passed in memory as a `va_list`
///
/// Every extraction advances the cursor by the width of the argument. Pointers
/// occupy four or eight bytes depending on the [`AddressWidth`].
#[derive(Clone, Debug)]
pub struct VaParams<M> {
    address: u64,
    memory: M,
    width: AddressWidth,
}

impl<M: Memory> VaParams<M> {
    /// Create a new cursor pointing to the argument at the given address
    pub fn new(address: u64, memory: M, width: AddressWidth) -> Self {
        Self {
            address,
            memory,
            width,
        }
    }

    /// Retrieve the address of the next argument
    pub fn address(&self) -> u64 {
        self.address
    }

    fn advance(&mut self, bytes: u8) {
        self.address = self.address.wrapping_add(bytes.into());
    }

    fn peek_ptr(&mut self) -> Result<u64, Error<M::Error>> {
        match self.width {
            AddressWidth::Bits32 => self.memory.read_u32(self.address).map(u64::from),
            AddressWidth::Bits64 => self.memory.read_u64(self.address),
        }
        .map_err(Error::Memory)
    }
}

impl<M: Memory> Params for VaParams<M> {
    type Error = Error<M::Error>;

    type Va<'a>
        = VaParams<&'a mut M>
    where
        Self: 'a;

    fn next_u8(&mut self) -> Result<u8, Self::Error> {
        let res = self.memory.read_u8(self.address).map_err(Error::Memory)?;
        self.advance(1);
        Ok(res)
    }

    fn next_u16(&mut self) -> Result<u16, Self::Error> {
        let res = self.memory.read_u16(self.address).map_err(Error::Memory)?;
        self.advance(2);
        Ok(res)
    }

    fn next_u32(&mut self) -> Result<u32, Self::Error> {
        let res = self.memory.read_u32(self.address).map_err(Error::Memory)?;
        self.advance(4);
        Ok(res)
    }

    fn next_u64(&mut self) -> Result<u64, Self::Error> {
        let res = self.memory.read_u64(self.address).map_err(Error::Memory)?;
        self.advance(8);
        Ok(res)
    }

    fn next_ptr(&mut self) -> Result<u64, Self::Error> {
        let res = self.peek_ptr()?;
        self.advance(self.width.bytes());
        Ok(res)
    }

    fn next_str(&mut self) -> Result<String, Self::Error> {
        let address = self.peek_ptr()?;
        let res = read_str(&mut self.memory, address).map_err(Error::Memory)?;
        self.advance(self.width.bytes());
        Ok(res)
    }

    fn next_va(&mut self) -> Result<Self::Va<'_>, Self::Error> {
        Err(Unsupported::NestedVariadic.into())
    }
}

/// Read a NUL terminated string of at most [`MAX_STR_LEN`] bytes
fn read_str<M: Memory>(memory: &mut M, address: u64) -> Result<String, M::Error> {
    let mut res = String::new();
    for offset in 0..MAX_STR_LEN as u64 {
        let byte = memory.read_u8(address.wrapping_add(offset))?;
        if byte == 0 {
            break;
        }
        res.push(char::from(byte));
    }
    Ok(res)
}
