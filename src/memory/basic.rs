// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Basic [`Memory`]s and adapters

use super::Memory;
use super::error::Error;

/// [`Memory`] adapter for an [`FnMut`]
///
/// This forwards calls to [`Memory::read_u8`] to the wrapped [`FnMut`].
#[derive(Copy, Clone, Default, Debug)]
pub struct Func<F: FnMut(u64) -> Result<u8, E>, E> {
    func: F,
    phantom: core::marker::PhantomData<E>,
}

impl<F: FnMut(u64) -> Result<u8, E>, E> Memory for Func<F, E> {
    type Error = E;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        (self.func)(address)
    }
}

/// Create a [`Func`] [`Memory`] from an [`FnMut`]
pub fn from_fn<F: FnMut(u64) -> Result<u8, E>, E>(func: F) -> Func<F, E> {
    Func {
        func,
        phantom: Default::default(),
    }
}

/// [`Memory`] consisting of a single contiguous segment
///
/// The segment starts at address `0`. Use [`Memory::with_offset`] for placing
/// it elsewhere.
#[derive(Copy, Clone, Debug)]
pub struct Segment<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> Segment<T> {
    /// Retrieve the backing data
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl<T: AsRef<[u8]>> Memory for Segment<T> {
    type Error = Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        let offset: usize = address.try_into().map_err(Error::ExceededHostUSize)?;
        self.data
            .as_ref()
            .get(offset)
            .copied()
            .ok_or(Error::NotMapped(address))
    }
}

/// Create a [`Segment`] [`Memory`] from some data
pub fn from_segment<T: AsRef<[u8]>>(data: T) -> Segment<T> {
    Segment { data }
}

/// A [`Memory`] without any mapped address
#[derive(Copy, Clone, Default, Debug)]
pub struct Empty;

impl Memory for Empty {
    type Error = Error;

    fn read_u8(&mut self, address: u64) -> Result<u8, Self::Error> {
        Err(Error::NotMapped(address))
    }
}
