// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Memory related error types and traits

use core::fmt;

/// A [`MaybeMiss`] allowing the construction of a miss
pub trait Miss: MaybeMiss {
    /// Construct a value indicating a miss
    ///
    /// This error value indicates that the [`Memory`][super::Memory] does not
    /// cover the given `address`.
    fn miss(address: u64) -> Self;
}

impl<T, E: Miss> Miss for Result<T, E> {
    fn miss(address: u64) -> Self {
        Err(<E as Miss>::miss(address))
    }
}

/// May indicate that an address is not covered by a [`Memory`][super::Memory]
///
/// A [`Memory`][super::Memory] usually only covers a subset of the address
/// space, e.g. a RAM region. This trait allows identifying errors caused by
/// accesses outside that region, which allows combining memories.
pub trait MaybeMiss {
    /// Check whether this value indicates a miss
    fn is_miss(&self) -> bool;
}

impl<T, E: MaybeMiss> MaybeMiss for Result<T, E> {
    fn is_miss(&self) -> bool {
        match self {
            Ok(_) => false,
            Err(e) => e.is_miss(),
        }
    }
}

#[cfg(feature = "either")]
impl<L: MaybeMiss, R: MaybeMiss> MaybeMiss for either::Either<L, R> {
    fn is_miss(&self) -> bool {
        either::for_both!(self, e => e.is_miss())
    }
}

/// Errors of the basic [`Memory`][super::Memory] adapters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The address is not mapped
    NotMapped(u64),
    /// Could not use an address or offset because it is too big for the host
    ExceededHostUSize(core::num::TryFromIntError),
}

impl Miss for Error {
    fn miss(address: u64) -> Self {
        Self::NotMapped(address)
    }
}

impl MaybeMiss for Error {
    fn is_miss(&self) -> bool {
        matches!(self, Self::NotMapped(_))
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::ExceededHostUSize(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMapped(address) => write!(f, "Address {address:#x} not mapped"),
            Self::ExceededHostUSize(_) => write!(
                f,
                "An offset exceeds what can be represented with host native addresses"
            ),
        }
    }
}
