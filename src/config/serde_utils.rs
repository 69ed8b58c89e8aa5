// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Serde-specific utilties

use core::fmt;

use serde::{Deserializer, Serializer};

use super::AddressWidth;

/// Serde "module" for (de)serilizing an [`AddressWidth`] as the number of bits
pub struct Width;

impl Width {
    pub fn serialize<S>(value: &AddressWidth, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(value.bits())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<AddressWidth, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(WidthVisitor)
    }
}

/// [`Visitor`][serde::de::Visitor] for parsing address widths
struct WidthVisitor;

impl serde::de::Visitor<'_> for WidthVisitor {
    type Value = AddressWidth;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "either 32 or 64")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            32 => Ok(AddressWidth::Bits32),
            64 => Ok(AddressWidth::Bits64),
            v => Err(E::invalid_value(
                serde::de::Unexpected::Signed(v),
                &"32 or 64",
            )),
        }
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            32 => Ok(AddressWidth::Bits32),
            64 => Ok(AddressWidth::Bits64),
            v => Err(E::invalid_value(
                serde::de::Unexpected::Unsigned(v),
                &"32 or 64",
            )),
        }
    }
}
