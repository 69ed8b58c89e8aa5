// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Access to the memory of the monitored hart
//!
//! Parameters passed by reference, strings and variadic arguments live in the
//! memory of the monitored hart. This module defines the [`Memory`] trait used
//! for reading it as well as a number of types implementing it:
//!
//! * [basic] adapters that may be created through free fns such as
//!   [`from_fn`] and [`from_segment`],
//! * modifiers such as [`Offset`] that are usually created through provided
//!   fns of the [`Memory`] trait and
//! * combinations through tuples, [`Option`] and, with the `either` feature,
//!   `Either`.
//!
//! Multi-byte values are always read in little endian byte order.
//!
//! # Example
//!
//! ```
//! use riscv_debug_monitor::memory::{self, Memory};
//!
//! let data = b"hello\0";
//! let mut mem = (
//!     memory::from_segment(data).with_offset(0x2000),
//!     memory::from_segment([0u8; 16]).with_offset(0x8000),
//! );
//! assert_eq!(mem.read_u8(0x2001), Ok(b'e'));
//! assert_eq!(mem.read_u32(0x8004), Ok(0));
//! assert!(mem.read_u8(0x4000).is_err());
//! ```

pub mod basic;
pub mod error;


pub use basic::{Empty, from_fn, from_segment};
pub use error::Error;

use error::{MaybeMiss, Miss};

/// Byte addressable memory
///
/// See the [module level][self] documentation for more details.
pub trait Memory {
    /// Error type returned by the read fns
    type Error;

    /// Read a single byte
    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error>;

    /// Read a little endian 16 bit value
    fn read_u16(&mut self, address: u64) -> Result<u16, Self::Error> {
        let low = self.read_u8(address)?;
        let high = self.read_u8(address.wrapping_add(1))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a little endian 32 bit value
    fn read_u32(&mut self, address: u64) -> Result<u32, Self::Error> {
        let low = self.read_u16(address)?;
        let high = self.read_u16(address.wrapping_add(2))?;
        Ok(u32::from(low) | (u32::from(high) << 16))
    }

    /// Read a little endian 64 bit value
    fn read_u64(&mut self, address: u64) -> Result<u64, Self::Error> {
        let low = self.read_u32(address)?;
        let high = self.read_u32(address.wrapping_add(4))?;
        Ok(u64::from(low) | (u64::from(high) << 32))
    }

    /// "Move" this memory by the given offset
    ///
    /// See [`Offset`] for more details.
    fn with_offset(self, offset: u64) -> Offset<Self>
    where
        Self: Sized,
        Self::Error: Miss,
    {
        Offset {
            inner: self,
            offset,
        }
    }
}

impl<M: Memory + ?Sized> Memory for &mut M {
    type Error = M::Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        M::read_u8(self, address)
    }

    fn read_u16(&mut self, address: u64) -> Result<u16, Self::Error> {
        M::read_u16(self, address)
    }

    fn read_u32(&mut self, address: u64) -> Result<u32, Self::Error> {
        M::read_u32(self, address)
    }

    fn read_u64(&mut self, address: u64) -> Result<u64, Self::Error> {
        M::read_u64(self, address)
    }
}

/// [`Memory`] implementation for a tuple of two memories
///
/// This impl allows combining [`Memory`]s as long as they agree on their error
/// type. If the first [`Memory`] returns a "miss", the second one is consulted.
/// Multi-byte reads are composed of single byte reads and may thus span both.
impl<A, B, E> Memory for (A, B)
where
    A: Memory<Error = E>,
    B: Memory<Error = E>,
    E: MaybeMiss,
{
    type Error = E;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        let res = self.0.read_u8(address);
        if res.is_miss() {
            self.1.read_u8(address)
        } else {
            res
        }
    }
}

impl<M> Memory for Option<M>
where
    M: Memory,
    M::Error: Miss,
{
    type Error = M::Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        self.as_mut()
            .map(|m| m.read_u8(address))
            .unwrap_or_else(|| Miss::miss(address))
    }
}

impl<M: Memory + ?Sized> Memory for alloc::boxed::Box<M> {
    type Error = M::Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        M::read_u8(self.as_mut(), address)
    }
}

#[cfg(feature = "either")]
impl<L, R, E> Memory for either::Either<L, R>
where
    L: Memory<Error = E>,
    R: Memory<Error = E>,
{
    type Error = E;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        either::for_both!(self, m => m.read_u8(address))
    }
}

/// [`Memory`] moved by a fixed offset
///
/// Accesses will be mapped by subtracting the fixed offset from the address.
/// Accesses to addresses lower than the offset will result in a [miss][Miss].
#[derive(Copy, Clone, Debug)]
pub struct Offset<M> {
    inner: M,
    offset: u64,
}

impl<M> Offset<M> {
    /// Retrieve the inner [`Memory`]
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Retrieve the offset
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<M> Memory for Offset<M>
where
    M: Memory,
    M::Error: Miss,
{
    type Error = M::Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        address
            .checked_sub(self.offset)
            .map(|a| self.inner.read_u8(a))
            .unwrap_or_else(|| Miss::miss(address))
    }
}
