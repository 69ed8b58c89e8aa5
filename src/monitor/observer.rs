// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Observers of function entries, exits and retired instructions
//!
//! Observers are callbacks registered with the [`Observers`] registry of a
//! [`Monitor`][super::Monitor]. Entry and exit observers are registered for
//! a set of function addresses and are called with the affected [`Frame`].
//! Exec observers are called for every retired instruction.
//!
//! Observers may register or remove observers, including themselves, while
//! they are being called. Dispatch operates on a snapshot of the registrations
//! taken before the first observer is called: observers removed in the
//! meantime are skipped, observers added only see the next dispatch.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::stack::Frame;

use super::event::Retired;

/// Handle identifying a registered observer
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

/// Target of an entry or exit observer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// A function's address
    Address(u64),
    /// A function's symbolic name
    Symbol(&'a str),
}

impl From<u64> for Target<'_> {
    fn from(address: u64) -> Self {
        Self::Address(address)
    }
}

impl From<u32> for Target<'_> {
    fn from(address: u32) -> Self {
        Self::Address(address.into())
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(name: &'a str) -> Self {
        Self::Symbol(name)
    }
}

/// Point of observation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Point {
    /// Function entry
    Entry,
    /// Function exit
    Exit,
    /// Every retired instruction
    Exec,
}

type FrameCallback = Rc<RefCell<dyn FnMut(&Frame)>>;
type ExecCallback = Rc<RefCell<dyn FnMut(&Retired)>>;

#[derive(Clone)]
enum Callback {
    Frame(FrameCallback),
    Exec(ExecCallback),
}

struct Registration {
    point: Point,
    targets: Vec<u64>,
    callback: Callback,
}

/// Observer registry
#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    registrations: BTreeMap<ObserverId, Registration>,
    entry: BTreeMap<u64, Vec<ObserverId>>,
    exit: BTreeMap<u64, Vec<ObserverId>>,
    exec: Vec<ObserverId>,
    cancel: BTreeMap<ObserverId, Box<dyn FnOnce()>>,
}

impl Registry {
    fn reserve(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, id: ObserverId, point: Point, mut targets: Vec<u64>, callback: Callback) {
        targets.sort_unstable();
        targets.dedup();
        match point {
            Point::Entry => targets
                .iter()
                .for_each(|t| self.entry.entry(*t).or_default().push(id)),
            Point::Exit => targets
                .iter()
                .for_each(|t| self.exit.entry(*t).or_default().push(id)),
            Point::Exec => self.exec.push(id),
        }
        self.registrations.insert(
            id,
            Registration {
                point,
                targets,
                callback,
            },
        );
    }

    /// Remove a registration, returning it for dropping outside any borrow
    fn remove(&mut self, id: ObserverId) -> Option<(Registration, Option<Box<dyn FnOnce()>>)> {
        let registration = self.registrations.remove(&id)?;
        let index = match registration.point {
            Point::Entry => &mut self.entry,
            Point::Exit => &mut self.exit,
            Point::Exec => {
                self.exec.retain(|i| *i != id);
                return Some((registration, self.cancel.remove(&id)));
            }
        };
        for target in &registration.targets {
            if let Some(ids) = index.get_mut(target) {
                ids.retain(|i| *i != id);
                if ids.is_empty() {
                    index.remove(target);
                }
            }
        }
        Some((registration, self.cancel.remove(&id)))
    }

    fn callback(&self, id: ObserverId) -> Option<Callback> {
        self.registrations.get(&id).map(|r| r.callback.clone())
    }
}

/// Shared handle to the observer registry of a [`Monitor`][super::Monitor]
///
/// Handles are cheap to clone and may be moved into observers.
#[derive(Clone, Default)]
pub struct Observers {
    registry: Rc<RefCell<Registry>>,
}

impl Observers {
    /// Register an observer for the entry of any of the given functions
    pub fn add_entry(
        &self,
        targets: impl IntoIterator<Item = u64>,
        callback: impl FnMut(&Frame) + 'static,
    ) -> ObserverId {
        self.add_frame(Point::Entry, targets.into_iter().collect(), callback)
    }

    /// Register an observer for the exit of any of the given functions
    ///
    /// Functions are identified by their entry address.
    pub fn add_exit(
        &self,
        targets: impl IntoIterator<Item = u64>,
        callback: impl FnMut(&Frame) + 'static,
    ) -> ObserverId {
        self.add_frame(Point::Exit, targets.into_iter().collect(), callback)
    }

    /// Register an observer for every retired instruction
    pub fn add_exec(&self, callback: impl FnMut(&Retired) + 'static) -> ObserverId {
        let mut registry = self.registry.borrow_mut();
        let id = registry.reserve();
        registry.insert(
            id,
            Point::Exec,
            Vec::new(),
            Callback::Exec(Rc::new(RefCell::new(callback))),
        );
        id
    }

    /// Remove an observer
    ///
    /// Returns `false` if no observer with the given id was registered.
    pub fn remove(&self, id: ObserverId) -> bool {
        let removed = self.registry.borrow_mut().remove(id);
        removed.is_some()
    }

    /// Retrieve the number of registered observers
    pub fn len(&self) -> usize {
        self.registry.borrow().registrations.len()
    }

    /// Determine whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn add_frame(
        &self,
        point: Point,
        targets: Vec<u64>,
        callback: impl FnMut(&Frame) + 'static,
    ) -> ObserverId {
        let id = self.reserve();
        self.insert_frame(id, point, targets, callback);
        id
    }

    pub(crate) fn reserve(&self) -> ObserverId {
        self.registry.borrow_mut().reserve()
    }

    pub(crate) fn insert_frame(
        &self,
        id: ObserverId,
        point: Point,
        targets: Vec<u64>,
        callback: impl FnMut(&Frame) + 'static,
    ) {
        self.registry.borrow_mut().insert(
            id,
            point,
            targets,
            Callback::Frame(Rc::new(RefCell::new(callback))),
        );
    }

    /// Insert an exec observer which is cancelled on a reset
    pub(crate) fn insert_cancellable(
        &self,
        id: ObserverId,
        callback: impl FnMut(&Retired) + 'static,
        cancel: impl FnOnce() + 'static,
    ) {
        let mut registry = self.registry.borrow_mut();
        registry.insert(
            id,
            Point::Exec,
            Vec::new(),
            Callback::Exec(Rc::new(RefCell::new(callback))),
        );
        registry.cancel.insert(id, Box::new(cancel));
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<Registry>> {
        Rc::downgrade(&self.registry)
    }

    /// Call all entry observers registered for the frame's entry address
    pub(crate) fn dispatch_entry(&self, frame: &Frame) {
        let ids = self.registry.borrow().entry.get(&frame.entry).cloned();
        self.dispatch_frame(ids.unwrap_or_default(), frame)
    }

    /// Call all exit observers registered for the frame's entry address
    pub(crate) fn dispatch_exit(&self, frame: &Frame) {
        let ids = self.registry.borrow().exit.get(&frame.entry).cloned();
        self.dispatch_frame(ids.unwrap_or_default(), frame)
    }

    /// Call all exec observers
    pub(crate) fn dispatch_exec(&self, retired: &Retired) {
        let ids = self.registry.borrow().exec.clone();
        for id in ids {
            let callback = self.registry.borrow().callback(id);
            if let Some(Callback::Exec(callback)) = callback {
                (&mut *callback.borrow_mut())(retired);
            }
        }
    }

    /// Remove all cancellable observers and run their cancellation
    pub(crate) fn cancel_all(&self) {
        let ids: Vec<_> = self.registry.borrow().cancel.keys().copied().collect();
        for id in ids {
            let removed = self.registry.borrow_mut().remove(id);
            if let Some((_, Some(cancel))) = removed {
                cancel();
            }
        }
    }

    fn dispatch_frame(&self, ids: Vec<ObserverId>, frame: &Frame) {
        for id in ids {
            let callback = self.registry.borrow().callback(id);
            if let Some(Callback::Frame(callback)) = callback {
                (&mut *callback.borrow_mut())(frame);
            }
        }
    }
}

/// Remove a registration through a weak registry handle
///
/// The registration is dropped only after the registry was released.
pub(crate) fn remove_weak(registry: &Weak<RefCell<Registry>>, id: ObserverId) -> bool {
    let Some(registry) = registry.upgrade() else {
        return false;
    };
    let removed = registry.borrow_mut().remove(id);
    removed.is_some()
}
