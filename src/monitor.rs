// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Monitoring logic
//!
//! This module provides the [`Monitor`], which processes [`ExecEvent`]s, i.e.
//! records of retired instructions, and reconstructs the call stack of the
//! monitored hart from them.
//!
//! # Call and return detection
//!
//! Whether an instruction is a call or a return is determined by the
//! [classifier][crate::instruction::classify]. Whether it actually transferred
//! control is only known once the next instruction is retired: the previous
//! instruction is classified and the current pc is the target of the transfer.
//! The monitor thus keeps the last instruction it saw, unless the event
//! record itself supplies the previous instruction.
//!
//! # Observers and waiters
//!
//! Users may observe function entries and exits through [observers][observer]
//! or wait for them through the [`Future`][core::future::Future]s provided by
//! [`on_entry`][Monitor::on_entry], [`on_exit`][Monitor::on_exit] and
//! [`wait_until`][Monitor::wait_until]. All of them are driven by
//! [`step`][Monitor::step].

pub mod display;
pub mod event;
pub mod observer;
pub mod wait;

#[cfg(test)]
mod tests;

pub use event::{Event, ExecEvent, MemWrite, Retired};
pub use observer::{ObserverId, Observers, Target};
pub use wait::{Wait, WaitExec};

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::config::{self, AddressWidth, Config, TraceLevel};
use crate::error::Error;
use crate::instruction::{self, Disassembly};
use crate::memory::Memory;
use crate::params::RegisterParams;
use crate::registers::Registers;
use crate::stack::{CallStack, Frame};
use crate::symbols::{SymbolTable, Symbols};

use display::{Sink, TextField};
use instruction::format::Register;
use observer::Point;

/// Monitor
///
/// A monitor processes [`ExecEvent`]s for a single RISC-V hart. Each event is
/// fed to the monitor through [`step`][Self::step], which updates the call
/// stack, notifies observers and refreshes the display side-channel before
/// returning.
///
/// # Example
///
/// The following example feeds a call and a return to a monitor.
///
/// ```
/// use riscv_debug_monitor::monitor::{self, Event, ExecEvent};
/// use riscv_debug_monitor::symbols::SymbolTable;
///
/// let symbols: SymbolTable = [(0x100, "main"), (0x200, "helper")].into_iter().collect();
/// let mut monitor: monitor::Monitor = monitor::builder().with_symbols(symbols).build();
///
/// // jal ra,0x200
/// monitor.retire(0x100, 0x100000ef);
/// let event = monitor.retire(0x200, 0x00008067);
/// assert!(matches!(event, Some(Event::Call { target: 0x200, .. })));
/// assert_eq!(monitor.stack().top().map(|f| f.name.as_str()), Some("helper"));
///
/// // ret
/// monitor.step(&ExecEvent::new(0x104, 0x00000013));
/// assert_eq!(monitor.depth(), 0);
/// ```
pub struct Monitor<S: Symbols = SymbolTable, D: Sink = ()> {
    symbols: Option<S>,
    sink: D,
    config: Config,
    stack: CallStack,
    registers: Registers,
    last: Option<Retired>,
    observers: Observers,
    disasm: TextField,
    slots: Vec<TextField>,
}

impl<S: Symbols, D: Sink> Monitor<S, D> {
    /// Process a single [`ExecEvent`]
    ///
    /// Returns the call or return performed by the previous instruction, if
    /// any.
    pub fn step(&mut self, event: &ExecEvent) -> Option<Event> {
        let current = event.current;
        if let Some(write) = event.write {
            log::trace!(
                "{:#010x}: write {:#010x} to {:#010x} (mask {:#06b})",
                current.pc,
                write.data,
                write.addr,
                write.mask,
            );
        }

        self.observers.dispatch_exec(&current);

        let previous = event.previous.or(self.last);
        let res = match previous {
            Some(_) if event.interrupt => {
                log::debug!("{:#010x}: reached via trap, not classified", current.pc);
                None
            }
            Some(previous) => self.transfer(previous, current),
            None => None,
        };

        if self.config.trace_level == TraceLevel::All {
            let text = Disassembly::new(current.pc, current.insn).to_string();
            let sink = &mut self.sink;
            self.disasm.set(&text, |i, c| sink.disasm_char(i, c));
        }

        self.last = Some(current);
        res
    }

    /// Process a single retired instruction
    ///
    /// The instruction retired before is assumed to be the one passed to the
    /// last call of this fn or [`step`][Self::step].
    pub fn retire(&mut self, pc: u32, insn: u32) -> Option<Event> {
        self.step(&ExecEvent::new(pc, insn))
    }

    /// Enter the function at `pc`
    ///
    /// A new [`Frame`] is pushed and observers registered for the entry of
    /// the function are notified.
    pub fn enter(&mut self, pc: u64, return_addr: u64) {
        let name = self
            .symbols
            .as_ref()
            .and_then(|s| s.name(pc))
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("<unknown {pc:#x}>"));
        let frame = self
            .stack
            .enter(pc, return_addr, name, self.registers)
            .clone();
        log::info!(
            "Entering {} ({pc:#x}), depth {}",
            frame.name,
            self.stack.depth()
        );

        if let Some(slot) = frame.slot {
            self.set_slot_text(slot, &frame.name);
        }
        self.observers.dispatch_entry(&frame);
    }

    /// Exit the current function, returning to `pc`
    ///
    /// The innermost [`Frame`] is popped and observers registered for the exit
    /// of its function are notified. Returns the [`Frame`] popped.
    ///
    /// A return without any [`Frame`] on the stack is logged and otherwise
    /// ignored.
    pub fn exit(&mut self, pc: u64) -> Option<Frame> {
        let Some(frame) = self.stack.pop() else {
            log::warn!("Return to {pc:#x} without open call frame");
            return None;
        };
        if frame.return_addr != pc {
            log::debug!(
                "Return from {} to {pc:#x}, expected {:#x}",
                frame.name,
                frame.return_addr
            );
        }
        log::info!(
            "Leaving {} ({:#x}), depth {}",
            frame.name,
            frame.entry,
            self.stack.depth()
        );

        self.observers.dispatch_exit(&frame);
        if let Some(slot) = frame.slot {
            self.set_slot_text(slot, "");
        }
        self.stack.release(&frame);
        Some(frame)
    }

    /// Update a general purpose register
    pub fn write_reg(&mut self, reg: Register, value: u32) {
        self.registers.set(reg, value)
    }

    /// Retrieve the value of a general purpose register
    pub fn reg(&self, reg: Register) -> u32 {
        self.registers.get(reg)
    }

    /// Retrieve the current values of all general purpose registers
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Create a cursor over the arguments in the current registers
    ///
    /// This is usually done from within an entry observer or after an
    /// [`on_entry`][Self::on_entry] waiter resolved. For arguments of frames
    /// entered earlier, use [`Frame::params`].
    pub fn params<M: Memory>(&self, memory: M) -> RegisterParams<M> {
        RegisterParams::new(self.registers, memory, self.config.address_width)
    }

    /// Retrieve the current [`TraceLevel`]
    pub fn trace_level(&self) -> TraceLevel {
        self.config.trace_level
    }

    /// Set the [`TraceLevel`]
    ///
    /// The disassembly text is cleared when leaving [`TraceLevel::All`].
    pub fn set_trace_level(&mut self, level: TraceLevel) {
        if level != TraceLevel::All {
            let sink = &mut self.sink;
            self.disasm.clear(|i, c| sink.disasm_char(i, c));
        }
        self.config.trace_level = level;
        self.sink.trace_level(level);
    }

    /// Load the symbols of a new program image
    pub fn load_symbols(&mut self, symbols: S) {
        self.symbols = Some(symbols);
    }

    /// Retrieve the symbols of the program image, if one is loaded
    pub fn symbols(&self) -> Option<&S> {
        self.symbols.as_ref()
    }

    /// Reset the monitor
    ///
    /// All frames are removed, display texts are cleared and pending
    /// [`wait_until`][Self::wait_until] waiters resolve to [`None`]. Observers
    /// stay registered.
    pub fn reset(&mut self) {
        log::debug!("Reset at depth {}", self.stack.depth());
        self.stack.clear();
        self.last = None;
        self.registers = Default::default();

        let sink = &mut self.sink;
        self.disasm.clear(|i, c| sink.disasm_char(i, c));
        for (slot, field) in self.slots.iter_mut().enumerate() {
            field.clear(|i, c| sink.frame_char(slot, i, c));
        }
        self.observers.cancel_all();
    }

    /// Retrieve the current call stack depth
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Retrieve the [`CallStack`]
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Retrieve the [`Config`]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retrieve the current disassembly text
    pub fn disasm_text(&self) -> String {
        self.disasm.text()
    }

    /// Retrieve the current text of a window slot
    pub fn slot_text(&self, slot: usize) -> Option<String> {
        self.slots.get(slot).map(TextField::text)
    }

    /// Retrieve the [`Sink`]
    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Retrieve the [`Sink`] mutably
    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Retrieve a handle to the observer registry
    pub fn observers(&self) -> Observers {
        self.observers.clone()
    }

    /// Register an observer for the entry of any of the given functions
    pub fn add_entry_observer<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
        callback: impl FnMut(&Frame) + 'static,
    ) -> Result<ObserverId, Error> {
        let targets = self.resolve(targets)?;
        Ok(self.observers.add_entry(targets, callback))
    }

    /// Register an observer for the exit of any of the given functions
    pub fn add_exit_observer<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
        callback: impl FnMut(&Frame) + 'static,
    ) -> Result<ObserverId, Error> {
        let targets = self.resolve(targets)?;
        Ok(self.observers.add_exit(targets, callback))
    }

    /// Register an observer for every retired instruction
    pub fn add_exec_observer(&self, callback: impl FnMut(&Retired) + 'static) -> ObserverId {
        self.observers.add_exec(callback)
    }

    /// Remove an observer
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Wait for the entry of any of the given functions
    pub fn on_entry<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
    ) -> Result<Wait, Error> {
        let targets = self.resolve(targets)?;
        Ok(Wait::new(&self.observers, Point::Entry, targets))
    }

    /// Wait for the exit of any of the given functions
    pub fn on_exit<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
    ) -> Result<Wait, Error> {
        let targets = self.resolve(targets)?;
        Ok(Wait::new(&self.observers, Point::Exit, targets))
    }

    /// Wait until an instruction at any of the given addresses is retired
    pub fn wait_until<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
        max_instructions: Option<u64>,
    ) -> Result<WaitExec, Error> {
        let targets = self.resolve(targets)?;
        Ok(WaitExec::new(&self.observers, targets, max_instructions))
    }

    /// Resolve targets to a deduplicated list of addresses
    fn resolve<'a, T: Into<Target<'a>>>(
        &self,
        targets: impl IntoIterator<Item = T>,
    ) -> Result<Vec<u64>, Error> {
        let mut res = targets
            .into_iter()
            .map(|t| match t.into() {
                Target::Address(address) => Ok(address),
                Target::Symbol(name) => self
                    .symbols
                    .as_ref()
                    .ok_or(Error::NoImageLoaded)?
                    .resolve(name),
            })
            .collect::<Result<Vec<_>, _>>()?;
        res.sort_unstable();
        res.dedup();
        Ok(res)
    }

    /// Handle a potential transfer from `previous` to `current`
    fn transfer(&mut self, previous: Retired, current: Retired) -> Option<Event> {
        let transfer = instruction::classify(previous.insn);
        let target = u64::from(current.pc);
        if transfer.call {
            if transfer.is_ambiguous() {
                log::debug!(
                    "{:#010x}: {:#010x} is both call and return, treated as call",
                    previous.pc,
                    previous.insn
                );
            }
            let return_addr = previous.pc.wrapping_add(transfer.fallthrough());
            self.enter(target, return_addr.into());
            Some(Event::Call {
                target,
                return_addr: return_addr.into(),
                insn: previous,
            })
        } else if transfer.ret {
            self.exit(target);
            Some(Event::Return {
                target,
                insn: previous,
            })
        } else {
            if self.config.trace_level >= TraceLevel::Jumps
                && current.pc != previous.pc.wrapping_add(transfer.fallthrough())
            {
                log::debug!("{:#010x}: jump to {:#010x}", previous.pc, current.pc);
            }
            None
        }
    }

    fn set_slot_text(&mut self, slot: usize, text: &str) {
        let sink = &mut self.sink;
        if let Some(field) = self.slots.get_mut(slot) {
            field.set(text, |i, c| sink.frame_char(slot, i, c));
        }
    }
}

/// Create a new [`Builder`] for [`Monitor`]s
pub fn builder() -> Builder {
    Default::default()
}

/// Builder for [`Monitor`]
///
/// A builder will build a single [`Monitor`] for a single RISC-V hart.
#[derive(Copy, Clone, Debug)]
pub struct Builder<S = SymbolTable, D = ()> {
    symbols: Option<S>,
    sink: D,
    config: Config,
}

impl Builder {
    /// Create a new builder for a [`Monitor`]
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S, D> Builder<S, D> {
    /// Build the [`Monitor`] with the given [`Config`]
    ///
    /// New builders assume the [`Default`] config.
    pub fn with_config(self, config: &Config) -> Self {
        Self {
            config: *config,
            ..self
        }
    }

    /// Build the [`Monitor`] with the given [`Symbols`]
    ///
    /// New builders carry no symbols. Until symbols are
    /// [loaded][Monitor::load_symbols], functions can not be referred to by
    /// name and are displayed as unknown.
    pub fn with_symbols<T>(self, symbols: T) -> Builder<T, D> {
        Builder {
            symbols: Some(symbols),
            sink: self.sink,
            config: self.config,
        }
    }

    /// Build the [`Monitor`] with the given [`Sink`]
    pub fn with_sink<E>(self, sink: E) -> Builder<S, E> {
        Builder {
            symbols: self.symbols,
            sink,
            config: self.config,
        }
    }

    /// Build a [`Monitor`] with the given number of display slots
    pub fn with_window_size(self, window_size: usize) -> Self {
        Self {
            config: Config {
                window_size,
                ..self.config
            },
            ..self
        }
    }

    /// Build a [`Monitor`] starting with the given [`TraceLevel`]
    pub fn with_trace_level(self, trace_level: TraceLevel) -> Self {
        Self {
            config: Config {
                trace_level,
                ..self.config
            },
            ..self
        }
    }

    /// Build a [`Monitor`] for a hart with the given [`AddressWidth`]
    pub fn with_address_width(self, address_width: AddressWidth) -> Self {
        Self {
            config: Config {
                address_width,
                ..self.config
            },
            ..self
        }
    }

    /// Build the [`Monitor`]
    pub fn build(self) -> Monitor<S, D>
    where
        S: Symbols,
        D: Sink,
    {
        let config = self.config;
        let mut sink = self.sink;
        sink.trace_level(config.trace_level);
        Monitor {
            symbols: self.symbols,
            sink,
            config,
            stack: CallStack::new(config.window_size),
            registers: Default::default(),
            last: None,
            observers: Default::default(),
            disasm: TextField::new(config.msg_size),
            slots: (0..config.window_size)
                .map(|_| TextField::new(config.msg_size))
                .collect(),
        }
    }
}

impl<S, D: Default> Default for Builder<S, D> {
    fn default() -> Self {
        Self {
            symbols: None,
            sink: Default::default(),
            config: config::CONFIG,
        }
    }
}
