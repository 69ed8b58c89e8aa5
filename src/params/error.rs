// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Parameter extraction errors

use core::fmt;

/// Parameter extraction errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The requested parameter is not supported
    UnsupportedParameter(Unsupported),
    /// Memory could not be accessed
    Memory(E),
}

impl<E> From<Unsupported> for Error<E> {
    fn from(kind: Unsupported) -> Self {
        Self::UnsupportedParameter(kind)
    }
}

impl<E> core::error::Error for Error<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Memory(inner) => Some(inner),
            _ => None,
        }
    }
}

impl<E> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedParameter(kind) => write!(f, "Unsupported parameter: {kind}"),
            Self::Memory(_) => write!(f, "Could not access memory"),
        }
    }
}

/// Kinds of unsupported parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unsupported {
    /// A 64 bit scalar passed in registers
    Wide,
    /// An argument beyond the eighth, passed on the stack
    StackSpill,
    /// A `va_list` passed as a variadic argument
    NestedVariadic,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wide => write!(f, "64 bit scalar in register"),
            Self::StackSpill => write!(f, "argument passed on the stack"),
            Self::NestedVariadic => write!(f, "nested variadic arguments"),
        }
    }
}
