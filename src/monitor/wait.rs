// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Waiting for function entries, exits and retired instructions
//!
//! The [`Future`]s defined in this module resolve when the awaited event is
//! observed by the [`Monitor`][super::Monitor]. They are driven by
//! [`Monitor::step`][super::Monitor::step] rather than by polling: polling
//! only checks whether the event was observed already. Every waiter resolves
//! at most once and deregisters itself when resolved or dropped.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::stack::Frame;

use super::observer::{self, ObserverId, Observers, Point, Registry};

/// State shared between a waiter and its observer
#[derive(Debug)]
struct State<T> {
    value: Option<T>,
    resolved: bool,
    waker: Option<Waker>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            value: None,
            resolved: false,
            waker: None,
        }
    }
}

impl<T> State<T> {
    /// Resolve with the given value, returning the [`Waker`] to wake
    ///
    /// The [`Waker`] must only be woken after the state is released, since
    /// waking may poll the waiter.
    fn resolve(&mut self, value: T) -> Option<Waker> {
        if self.resolved {
            return None;
        }
        self.value = Some(value);
        self.resolved = true;
        self.waker.take()
    }

    fn poll(&mut self, cx: &mut Context<'_>) -> Poll<T> {
        match self.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                self.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Resolve a waiter's state, if it still exists
fn wake<T>(state: &Weak<RefCell<State<T>>>, value: T) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let waker = state.borrow_mut().resolve(value);
    if let Some(waker) = waker {
        waker.wake();
    }
}

/// Resolve a waiter's state and remove its observer
fn resolve<T>(
    state: &Weak<RefCell<State<T>>>,
    registry: &Weak<RefCell<Registry>>,
    id: ObserverId,
    value: T,
) {
    wake(state, value);
    observer::remove_weak(registry, id);
}

/// [`Future`] waiting for the entry or exit of a function
///
/// Resolves to the [`Frame`] of the function entered or exited.
#[derive(Debug)]
pub struct Wait {
    state: Rc<RefCell<State<Frame>>>,
    registry: Weak<RefCell<Registry>>,
    id: ObserverId,
}

impl Wait {
    pub(super) fn new(observers: &Observers, point: Point, targets: Vec<u64>) -> Self {
        let state: Rc<RefCell<State<Frame>>> = Default::default();
        let registry = observers.downgrade();
        let id = observers.reserve();

        let weak_state = Rc::downgrade(&state);
        let weak_registry = registry.clone();
        observers.insert_frame(id, point, targets, move |frame: &Frame| {
            resolve(&weak_state, &weak_registry, id, frame.clone())
        });

        Self {
            state,
            registry,
            id,
        }
    }

    /// Retrieve the id of the underlying observer
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Determine whether the awaited event was observed
    pub fn is_resolved(&self) -> bool {
        self.state.borrow().resolved
    }
}

impl Future for Wait {
    type Output = Frame;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.state.borrow_mut().poll(cx)
    }
}

impl Drop for Wait {
    fn drop(&mut self) {
        observer::remove_weak(&self.registry, self.id);
    }
}

/// [`Future`] waiting for an instruction at one of a set of addresses
///
/// Resolves to the address of the first matching instruction retired or to
/// [`None`] if the [`Monitor`][super::Monitor] was reset before.
#[derive(Debug)]
pub struct WaitExec {
    state: Rc<RefCell<State<Option<u64>>>>,
    registry: Weak<RefCell<Registry>>,
    id: ObserverId,
    max_instructions: Option<u64>,
}

impl WaitExec {
    pub(super) fn new(
        observers: &Observers,
        targets: Vec<u64>,
        max_instructions: Option<u64>,
    ) -> Self {
        let state: Rc<RefCell<State<Option<u64>>>> = Default::default();
        let registry = observers.downgrade();
        let id = observers.reserve();

        let weak_state = Rc::downgrade(&state);
        let weak_registry = registry.clone();
        let cancel_state = weak_state.clone();
        observers.insert_cancellable(
            id,
            move |retired| {
                let pc = u64::from(retired.pc);
                if targets.contains(&pc) {
                    resolve(&weak_state, &weak_registry, id, Some(pc))
                }
            },
            move || wake(&cancel_state, None),
        );

        Self {
            state,
            registry,
            id,
            max_instructions,
        }
    }

    /// Retrieve the id of the underlying observer
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Retrieve the maximum number of instructions requested
    ///
    /// This limit is not enforced by the [`Monitor`][super::Monitor].
    pub fn max_instructions(&self) -> Option<u64> {
        self.max_instructions
    }

    /// Determine whether the waiter was resolved
    pub fn is_resolved(&self) -> bool {
        self.state.borrow().resolved
    }
}

impl Future for WaitExec {
    type Output = Option<u64>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.state.borrow_mut().poll(cx)
    }
}

impl Drop for WaitExec {
    fn drop(&mut self) {
        observer::remove_weak(&self.registry, self.id);
    }
}
