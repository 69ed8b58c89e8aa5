// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! ELF related utilities

use core::fmt;

use elf::ElfBytes;
use elf::endian::EndianParse;

use super::SymbolTable;

impl SymbolTable {
    /// Create a [`SymbolTable`] from the `.symtab` of an ELF file
    ///
    /// Only RISC-V little endian files are accepted. Symbols without a name
    /// as well as file and section symbols are skipped. If multiple symbols
    /// share an address, a function symbol is preferred for naming it.
    pub fn from_elf<P: EndianParse>(elf: &ElfBytes<'_, P>) -> Result<Self, Error> {
        use elf::abi;

        let hdr = &elf.ehdr;
        if hdr.e_machine != abi::EM_RISCV {
            return Err(Error::UnsupportedArchitecture);
        }
        if !hdr.endianness.is_little() {
            return Err(Error::UnsupportedEndianess);
        }

        let (symtab, strtab) = elf
            .symbol_table()
            .map_err(Error::Parse)?
            .ok_or(Error::NoSymbolTable)?;

        let mut table = Self::new();
        for sym in symtab.iter() {
            let kind = sym.st_symtype();
            if sym.st_name == 0 || kind == abi::STT_FILE || kind == abi::STT_SECTION {
                continue;
            }
            let name = strtab.get(sym.st_name as usize).map_err(Error::Parse)?;
            if kind == abi::STT_FUNC {
                table.insert_preferred(sym.st_value, name);
            } else {
                table.insert(sym.st_value, name);
            }
        }
        log::debug!("Loaded {} symbols", table.len());
        Ok(table)
    }

    /// Parse ELF data and create a [`SymbolTable`] from its `.symtab`
    pub fn from_elf_data(data: &[u8]) -> Result<Self, Error> {
        let elf = ElfBytes::<elf::endian::AnyEndian>::minimal_parse(data).map_err(Error::Parse)?;
        Self::from_elf(&elf)
    }
}

/// ELF specific error type
#[derive(Debug)]
pub enum Error {
    /// The ELF file is not a RISC-V ELF file
    UnsupportedArchitecture,
    /// The ELF file is not little endian
    UnsupportedEndianess,
    /// The ELF file does not contain a `.symtab`
    NoSymbolTable,
    /// The ELF data could not be parsed
    Parse(elf::parse::ParseError),
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Parse(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedArchitecture => write!(f, "Unsupported architecture"),
            Self::UnsupportedEndianess => write!(f, "Unsupported endianess"),
            Self::NoSymbolTable => write!(f, "No symbol table found"),
            Self::Parse(_) => write!(f, "Could not parse ELF data"),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UnsupportedArchitecture, Self::UnsupportedArchitecture) => true,
            (Self::UnsupportedEndianess, Self::UnsupportedEndianess) => true,
            (Self::NoSymbolTable, Self::NoSymbolTable) => true,
            (Self::Parse(_), Self::Parse(_)) => true,
            _ => false,
        }
    }
}
