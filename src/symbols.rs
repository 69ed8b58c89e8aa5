// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Symbols of the program being monitored
//!
//! Call stacks are displayed with symbolic function names, and observers may
//! refer to functions by name. This module defines the [`Symbols`] trait used
//! by the [`Monitor`][crate::monitor::Monitor] for mapping addresses to names
//! and vice versa, as well as a [`SymbolTable`] implementing it. A
//! [`SymbolTable`] may be created from an ELF file's `.symtab` if the `elf`
//! feature is enabled.
//!
//! # Example
//!
//! ```
//! use riscv_debug_monitor::symbols::{Symbols, SymbolTable};
//!
//! let symbols: SymbolTable = [(0x1000, "main"), (0x1080, "helper")].into_iter().collect();
//! assert_eq!(symbols.name(0x1080), Some("helper"));
//! assert_eq!(symbols.address("main"), Some(0x1000));
//! ```

#[cfg(feature = "elf")]
pub mod elf;


use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use crate::error::Error;

/// Bidirectional mapping between addresses and symbol names
pub trait Symbols {
    /// Retrieve the name of the symbol at the given address
    fn name(&self, address: u64) -> Option<&str>;

    /// Retrieve the address of the symbol with the given name
    fn address(&self, name: &str) -> Option<u64>;

    /// Resolve a name, failing with [`Error::SymbolNotFound`] if absent
    fn resolve(&self, name: &str) -> Result<u64, Error> {
        self.address(name)
            .ok_or_else(|| Error::SymbolNotFound(name.to_string()))
    }
}

impl<S: Symbols + ?Sized> Symbols for &S {
    fn name(&self, address: u64) -> Option<&str> {
        S::name(self, address)
    }

    fn address(&self, name: &str) -> Option<u64> {
        S::address(self, name)
    }
}

impl<S: Symbols + ?Sized> Symbols for alloc::boxed::Box<S> {
    fn name(&self, address: u64) -> Option<&str> {
        S::name(self.as_ref(), address)
    }

    fn address(&self, name: &str) -> Option<u64> {
        S::address(self.as_ref(), name)
    }
}

/// [`Symbols`] implementation for a tuple of two symbol sources
///
/// The first source is consulted first. This allows combining e.g. a firmware
/// and a bootrom.
impl<A: Symbols, B: Symbols> Symbols for (A, B) {
    fn name(&self, address: u64) -> Option<&str> {
        self.0.name(address).or_else(|| self.1.name(address))
    }

    fn address(&self, name: &str) -> Option<u64> {
        self.0.address(name).or_else(|| self.1.address(name))
    }
}

#[cfg(feature = "either")]
impl<L: Symbols, R: Symbols> Symbols for either::Either<L, R> {
    fn name(&self, address: u64) -> Option<&str> {
        either::for_both!(self, s => s.name(address))
    }

    fn address(&self, name: &str) -> Option<u64> {
        either::for_both!(self, s => s.address(name))
    }
}

/// [`Symbols`] backed by a pair of maps
///
/// If multiple names are inserted for the same address, the first one is
/// kept for the address to name direction unless it is
/// [replaced][Self::insert_preferred]. Every name is resolvable.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: BTreeMap<u64, String>,
    addresses: BTreeMap<String, u64>,
}

impl SymbolTable {
    /// Create a new, empty symbol table
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert a symbol
    ///
    /// Empty names are ignored.
    pub fn insert(&mut self, address: u64, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.names.entry(address).or_insert_with(|| name.clone());
        self.addresses.entry(name).or_insert(address);
    }

    /// Insert a symbol, replacing any name at the same address
    pub fn insert_preferred(&mut self, address: u64, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.names.insert(address, name.clone());
        self.addresses.entry(name).or_insert(address);
    }

    /// Retrieve the number of distinct names
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Determine whether the table holds no symbols
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Iterate over all address-name pairs, ordered by address
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.names.iter().map(|(a, n)| (*a, n.as_str()))
    }
}

impl Symbols for SymbolTable {
    fn name(&self, address: u64) -> Option<&str> {
        self.names.get(&address).map(String::as_str)
    }

    fn address(&self, name: &str) -> Option<u64> {
        self.addresses.get(name).copied()
    }
}

impl<N: Into<String>> FromIterator<(u64, N)> for SymbolTable {
    fn from_iter<T: IntoIterator<Item = (u64, N)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<N: Into<String>> Extend<(u64, N)> for SymbolTable {
    fn extend<T: IntoIterator<Item = (u64, N)>>(&mut self, iter: T) {
        iter.into_iter().for_each(|(a, n)| self.insert(a, n));
    }
}
