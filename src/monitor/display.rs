// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Display side-channel
//!
//! The [`Monitor`][super::Monitor] renders the current instruction and the
//! names of the functions on its call stack as text. That text is published
//! character by character through a [`Sink`], usually backed by fixed-width
//! character arrays in a simulation. Only characters which actually changed
//! are published.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::TraceLevel;

/// Character placed in positions no longer covered by the current text
pub const NUL: char = '\0';

/// Ellipsis appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Receiver of display updates
pub trait Sink {
    /// Update a single character of the disassembly text
    fn disasm_char(&mut self, idx: usize, ch: char);

    /// Update a single character of the name displayed in a window slot
    fn frame_char(&mut self, slot: usize, idx: usize, ch: char);

    /// Publish a new [`TraceLevel`]
    fn trace_level(&mut self, _level: TraceLevel) {}
}

impl Sink for () {
    fn disasm_char(&mut self, _: usize, _: char) {}

    fn frame_char(&mut self, _: usize, _: usize, _: char) {}
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn disasm_char(&mut self, idx: usize, ch: char) {
        S::disasm_char(self, idx, ch)
    }

    fn frame_char(&mut self, slot: usize, idx: usize, ch: char) {
        S::frame_char(self, slot, idx, ch)
    }

    fn trace_level(&mut self, level: TraceLevel) {
        S::trace_level(self, level)
    }
}

/// Fixed-width text field
///
/// Text exceeding the width is truncated, keeping the first `width - 3`
/// characters followed by an [`ELLIPSIS`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextField {
    width: usize,
    text: Vec<char>,
}

impl TextField {
    /// Create a new, empty field of the given width
    pub fn new(width: usize) -> Self {
        Self {
            width,
            text: Default::default(),
        }
    }

    /// Retrieve the width of this field
    pub fn width(&self) -> usize {
        self.width
    }

    /// Retrieve the current text
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Set the text, emitting every changed character
    ///
    /// Positions covered by the old but not by the new text are set to
    /// [`NUL`].
    pub fn set(&mut self, text: &str, mut emit: impl FnMut(usize, char)) {
        let mut new: Vec<char> = text.chars().collect();
        if new.len() > self.width {
            new.truncate(self.width.saturating_sub(ELLIPSIS.len()));
            new.extend(ELLIPSIS.chars());
            new.truncate(self.width);
        }

        new.iter()
            .enumerate()
            .filter(|(i, c)| self.text.get(*i) != Some(*c))
            .for_each(|(i, c)| emit(i, *c));
        (new.len()..self.text.len()).for_each(|i| emit(i, NUL));
        self.text = new;
    }

    /// Clear the text, emitting a [`NUL`] for every previously set character
    pub fn clear(&mut self, emit: impl FnMut(usize, char)) {
        self.set("", emit)
    }
}
