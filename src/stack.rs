// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Call stack reconstruction
//!
//! A [`CallStack`] holds the [`Frame`]s of all functions which were called but
//! did not yet return. The stack is not bounded in depth. However, only a
//! fixed number of [`Frame`]s may be displayed at a time. Each [`Frame`] is
//! thus assigned one of the slots of a [`Window`] when it is entered, if one
//! is available. A [`Frame`] keeps its slot until it is exited.


use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::config::AddressWidth;
use crate::memory::Memory;
use crate::params::RegisterParams;
use crate::registers::Registers;

/// A single function activation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Address of the function's entry
    pub entry: u64,
    /// Address at which execution is expected to continue after a return
    pub return_addr: u64,
    /// Symbolic name of the function
    pub name: String,
    /// Display slot assigned to this frame, if any
    pub slot: Option<usize>,
    /// Registers as they were when the function was entered
    pub registers: Registers,
}

impl Frame {
    /// Create a cursor over the function's arguments
    ///
    /// Arguments are extracted from the [`Registers`] captured on entry and,
    /// for arguments passed by reference, from the given [`Memory`].
    pub fn params<M: Memory>(&self, memory: M, width: AddressWidth) -> RegisterParams<M> {
        RegisterParams::new(self.registers, memory, width)
    }
}

/// Fixed set of display slots
///
/// Slots are allocated lowest index first.
#[derive(Clone, Debug, Default)]
pub struct Window {
    live: Vec<bool>,
}

impl Window {
    /// Create a new window with `size` slots
    pub fn new(size: usize) -> Self {
        Self {
            live: vec![false; size],
        }
    }

    /// Retrieve the number of slots
    pub fn size(&self) -> usize {
        self.live.len()
    }

    /// Allocate the lowest free slot
    pub fn allocate(&mut self) -> Option<usize> {
        let slot = self.live.iter().position(|l| !l)?;
        self.live[slot] = true;
        Some(slot)
    }

    /// Release a slot, returning whether it was live
    pub fn release(&mut self, slot: usize) -> bool {
        self.live
            .get_mut(slot)
            .map(|l| core::mem::replace(l, false))
            .unwrap_or(false)
    }

    /// Iterate over all live slots
    pub fn live_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, l)| **l)
            .map(|(n, _)| n)
    }

    /// Release all slots
    pub fn clear(&mut self) {
        self.live.iter_mut().for_each(|l| *l = false);
    }
}

/// Stack of [`Frame`]s mapped onto a [`Window`]
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
    window: Window,
}

impl CallStack {
    /// Create a new, empty call stack with `window_size` display slots
    pub fn new(window_size: usize) -> Self {
        Self {
            frames: Default::default(),
            window: Window::new(window_size),
        }
    }

    /// Enter a function, pushing a new [`Frame`]
    pub fn enter(
        &mut self,
        entry: u64,
        return_addr: u64,
        name: String,
        registers: Registers,
    ) -> &Frame {
        let slot = self.window.allocate();
        self.frames.push(Frame {
            entry,
            return_addr,
            name,
            slot,
            registers,
        });
        let depth = self.frames.len();
        &self.frames[depth - 1]
    }

    /// Exit the innermost function, popping its [`Frame`]
    ///
    /// The [`Frame`]'s slot is released. Returns [`None`] if the stack is
    /// empty.
    pub fn exit(&mut self) -> Option<Frame> {
        let frame = self.pop()?;
        self.release(&frame);
        Some(frame)
    }

    /// Pop the innermost [`Frame`] without releasing its slot
    ///
    /// The slot stays live until the [`Frame`] is [released][Self::release].
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Release the slot of a [`Frame`] previously [popped][Self::pop]
    pub fn release(&mut self, frame: &Frame) {
        if let Some(slot) = frame.slot {
            self.window.release(slot);
        }
    }

    /// Retrieve the current depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Retrieve all frames, outermost first
    pub fn frames(&self) -> &[Frame] {
        self.frames.as_ref()
    }

    /// Retrieve the innermost frame
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Retrieve the [`Window`]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Iterate over all slots currently assigned to a frame
    pub fn live_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.window.live_slots()
    }

    /// Remove all frames and release all slots
    pub fn clear(&mut self) {
        self.frames.clear();
        self.window.clear();
    }
}
