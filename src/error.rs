// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Errors related to symbol resolution

use alloc::string::String;
use core::fmt;

/// Symbol resolution errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A symbol was referred to by name, but no program image was loaded
    NoImageLoaded,
    /// A symbol was not found in the loaded program image
    SymbolNotFound(String),
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImageLoaded => write!(f, "No program image loaded"),
            Self::SymbolNotFound(name) => write!(f, "Symbol \"{name}\" does not exist"),
        }
    }
}
