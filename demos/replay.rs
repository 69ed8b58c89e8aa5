// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Replay of retired instruction traces
//!
//! This program feeds a textual trace of retired instructions to a monitor and
//! prints the calls and returns detected. The trace is supplied as a file with
//! one record per line:
//!
//!     <pc> <insn> [trap]
//!     x<reg> <value>
//!
//! where all numbers are hexadecimal. The first form is a retired instruction,
//! optionally reached through a trap. The second form is a register write.
//! Empty lines and lines starting with `#` are ignored.
//!
//! Symbols are taken from an optional ELF file. Optionally, the monitor
//! configuration may be supplied in the form of a TOML file. If run with
//! `--disasm`, every instruction is disassembled.

use std::path::PathBuf;

use riscv_debug_monitor::config::{Config, TraceLevel};
use riscv_debug_monitor::monitor::{self, Event, ExecEvent};
use riscv_debug_monitor::symbols::SymbolTable;

fn main() {
    use std::io::BufRead;

    let matches = clap::Command::new("Trace replay")
        .arg(
            clap::arg!(<trace> "Path to the instruction trace")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(-e --elf <FILE> "ELF file of the traced program")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(-c --config <FILE> "Monitor configuration")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(--disasm "Disassemble every instruction")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::arg!(-d --debug "Enable additional debug output")
                .env("DEBUG")
                .action(clap::ArgAction::SetTrue)
                .value_parser(clap::builder::FalseyValueParser::new()),
        )
        .get_matches();

    if matches.get_flag("debug") {
        // Records of the `log` facade are forwarded by the subscriber
        tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
            .with_writer(std::io::stderr)
            .init();
    }

    // We may want to display more or fewer frames ...
    let mut config: Config = matches
        .get_one::<PathBuf>("config")
        .map(|p| {
            let config = std::fs::read_to_string(p).expect("Could not load config");
            toml::from_str(config.as_ref()).expect("Could not parse config")
        })
        .unwrap_or_default();
    if matches.get_flag("disasm") {
        config.trace_level = TraceLevel::All;
    }
    log::debug!("Config: {config:?}");

    // ... and we want function names rather than addresses.
    let symbols = matches.get_one::<PathBuf>("elf").map(|p| {
        let data = std::fs::read(p).expect("Could not load ELF file");
        SymbolTable::from_elf_data(data.as_ref()).expect("Could not load symbols")
    });

    let builder = monitor::builder().with_config(&config);
    let mut monitor = match symbols {
        Some(symbols) => builder.with_symbols(symbols).build(),
        None => builder.build(),
    };

    let trace = matches
        .get_one::<PathBuf>("trace")
        .expect("No trace file specified");
    let trace = std::fs::File::open(trace).expect("Could not open trace file");
    for (n, line) in std::io::BufReader::new(trace).lines().enumerate() {
        let line = line.expect("Could not read trace");
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next().filter(|f| !f.starts_with('#')) else {
            continue;
        };
        let number = |f: Option<&str>| {
            let f = f.unwrap_or_else(|| panic!("Missing field in line {}", n + 1));
            let f = f.trim_start_matches("0x");
            u32::from_str_radix(f, 16).unwrap_or_else(|_| panic!("Invalid number in line {}", n + 1))
        };

        if let Some(reg) = first.strip_prefix('x') {
            let reg = reg.parse().expect("Invalid register");
            let value = number(fields.next());
            monitor.write_reg(reg, value);
            continue;
        }

        let pc = number(Some(first));
        let insn = number(fields.next());
        let trap = fields.next() == Some("trap");
        let event = monitor.step(&ExecEvent::new(pc, insn).with_interrupt(trap));

        if config.trace_level == TraceLevel::All {
            println!("{pc:08x}: {}", monitor.disasm_text());
        }
        let depth = monitor.depth();
        match event {
            Some(Event::Call { insn, .. }) => {
                let name = monitor.stack().top().map(|f| f.name.as_str()).unwrap_or("?");
                println!("{:indent$}-> {name} (from {:#x})", "", insn.pc, indent = 2 * depth);
            }
            Some(Event::Return { target, .. }) => {
                println!("{:indent$}<- {target:#x}", "", indent = 2 * (depth + 1));
            }
            None => (),
        }
    }
}
