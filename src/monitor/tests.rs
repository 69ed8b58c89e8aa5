// Copyright (C) 2026 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

use super::*;

use alloc::rc::Rc;
use alloc::vec;
use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use crate::memory;
use crate::params::Params;

/// `jal ra,+0x100`
const JAL_RA: u32 = 0x100000ef;
/// `jalr (ra)`, i.e. `ret`
const RET: u32 = 0x00008067;
/// `addi zero,zero,0`
const NOP: u32 = 0x00000013;

fn symbols() -> SymbolTable {
    [(0x100, "main"), (0x200, "helper"), (0x280, "a_very_long_function_name")]
        .into_iter()
        .collect()
}

fn call<S: Symbols, D: Sink>(monitor: &mut Monitor<S, D>, from: u32, to: u32) -> Option<Event> {
    monitor.step(&ExecEvent::new(to, NOP).with_previous(from, JAL_RA))
}

fn ret<S: Symbols, D: Sink>(monitor: &mut Monitor<S, D>, from: u32, to: u32) -> Option<Event> {
    monitor.step(&ExecEvent::new(to, NOP).with_previous(from, RET))
}

fn poll<F: Future + Unpin>(future: &mut F) -> Poll<F::Output> {
    let mut cx = Context::from_waker(Waker::noop());
    Pin::new(future).poll(&mut cx)
}

#[derive(Default)]
struct Recorder {
    disasm: Vec<(usize, char)>,
    frames: Vec<(usize, usize, char)>,
    levels: Vec<TraceLevel>,
}

impl Sink for Recorder {
    fn disasm_char(&mut self, idx: usize, ch: char) {
        self.disasm.push((idx, ch));
    }

    fn frame_char(&mut self, slot: usize, idx: usize, ch: char) {
        self.frames.push((slot, idx, ch));
    }

    fn trace_level(&mut self, level: TraceLevel) {
        self.levels.push(level);
    }
}

#[test]
fn main_calls_helper() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let mut wait = monitor.on_entry(["helper"]).expect("Could not wait");
    assert!(poll(&mut wait).is_pending());

    assert_eq!(monitor.retire(0x100, JAL_RA), None);
    assert!(poll(&mut wait).is_pending());

    let event = monitor.retire(0x200, RET);
    assert_eq!(
        event,
        Some(Event::Call {
            target: 0x200,
            return_addr: 0x104,
            insn: Retired::new(0x100, JAL_RA),
        })
    );
    assert_eq!(monitor.depth(), 1);
    assert!(wait.is_resolved());
    match poll(&mut wait) {
        Poll::Ready(frame) => {
            assert_eq!(frame.name, "helper");
            assert_eq!(frame.entry, 0x200);
            assert_eq!(frame.return_addr, 0x104);
            assert_eq!(frame.slot, Some(0));
        }
        Poll::Pending => panic!("Waiter not resolved"),
    }
    assert!(monitor.observers().is_empty());

    let event = monitor.retire(0x104, NOP);
    assert_eq!(
        event,
        Some(Event::Return {
            target: 0x104,
            insn: Retired::new(0x200, RET),
        })
    );
    assert_eq!(monitor.depth(), 0);
    assert_eq!(monitor.stack().live_slots().count(), 0);
}

#[test]
fn resolves_once() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let entries = Rc::new(Cell::new(0));
    let counter = entries.clone();
    monitor
        .add_entry_observer(["helper"], move |_| counter.set(counter.get() + 1))
        .expect("Could not add observer");
    let mut wait = monitor.on_entry(["helper"]).expect("Could not wait");

    call(&mut monitor, 0x100, 0x200);
    ret(&mut monitor, 0x200, 0x104);
    call(&mut monitor, 0x100, 0x200);
    assert_eq!(entries.get(), 2);
    assert!(matches!(poll(&mut wait), Poll::Ready(Frame { entry: 0x200, .. })));
    assert_eq!(monitor.observers().len(), 1);
}

/// Waker counting its wakes
#[derive(Default)]
struct CountingWaker(core::sync::atomic::AtomicUsize);

impl CountingWaker {
    fn count(&self) -> usize {
        self.0.load(core::sync::atomic::Ordering::SeqCst)
    }
}

impl alloc::task::Wake for CountingWaker {
    fn wake(self: alloc::sync::Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &alloc::sync::Arc<Self>) {
        self.0.fetch_add(1, core::sync::atomic::Ordering::SeqCst);
    }
}

#[test]
fn wakes_once() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let counter = alloc::sync::Arc::new(CountingWaker::default());
    let waker = Waker::from(counter.clone());
    let mut cx = Context::from_waker(&waker);

    let mut entry = monitor.on_entry(["helper"]).expect("Could not wait");
    let mut exec = monitor.wait_until([0x400u32], None).expect("Could not wait");
    assert!(Pin::new(&mut entry).poll(&mut cx).is_pending());
    assert!(Pin::new(&mut exec).poll(&mut cx).is_pending());

    call(&mut monitor, 0x100, 0x200);
    assert_eq!(counter.count(), 1);
    ret(&mut monitor, 0x200, 0x104);
    call(&mut monitor, 0x100, 0x200);
    assert_eq!(counter.count(), 1);
    assert!(entry.is_resolved());
    assert!(matches!(
        Pin::new(&mut entry).poll(&mut cx),
        Poll::Ready(Frame { entry: 0x200, .. })
    ));

    monitor.reset();
    assert_eq!(counter.count(), 2);
    assert_eq!(Pin::new(&mut exec).poll(&mut cx), Poll::Ready(None));
}

#[test]
fn on_exit() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let mut wait = monitor.on_exit(["helper", "helper"]).expect("Could not wait");
    call(&mut monitor, 0x100, 0x200);
    assert!(poll(&mut wait).is_pending());
    call(&mut monitor, 0x204, 0x100);
    ret(&mut monitor, 0x110, 0x208);
    assert!(poll(&mut wait).is_pending());
    ret(&mut monitor, 0x210, 0x104);
    match poll(&mut wait) {
        Poll::Ready(frame) => assert_eq!(frame.name, "helper"),
        Poll::Pending => panic!("Waiter not resolved"),
    }
}

#[test]
fn targets() {
    let monitor: Monitor = builder().build();
    assert_eq!(monitor.on_entry(["main"]).err(), Some(Error::NoImageLoaded));
    assert!(monitor.on_entry([0x100u64]).is_ok());

    let mut monitor: Monitor = builder().build();
    monitor.load_symbols(symbols());
    assert_eq!(
        monitor.wait_until(["nope"], None).err(),
        Some(Error::SymbolNotFound("nope".into()))
    );
    assert!(
        monitor
            .add_exit_observer([Target::from("main"), Target::from(0x300u32)], |_| ())
            .is_ok()
    );
}

#[test]
fn unknown_function() {
    let mut monitor: Monitor = builder().build();
    call(&mut monitor, 0x100, 0x300);
    let frame = monitor.stack().top().expect("No frame");
    assert_eq!(frame.name, "<unknown 0x300>");
    assert_eq!(monitor.slot_text(0).as_deref(), Some("<unknown 0x300>"));
}

#[test]
fn window() {
    let mut monitor = builder()
        .with_symbols(symbols())
        .with_sink(Recorder::default())
        .with_window_size(2)
        .build();
    call(&mut monitor, 0x0, 0x100);
    call(&mut monitor, 0x104, 0x200);
    call(&mut monitor, 0x204, 0x300);
    assert_eq!(monitor.depth(), 3);
    assert_eq!(monitor.stack().live_slots().count(), 2);
    assert_eq!(monitor.slot_text(0).as_deref(), Some("main"));
    assert_eq!(monitor.slot_text(1).as_deref(), Some("helper"));
    assert_eq!(monitor.slot_text(2), None);

    let frame = monitor.exit(0x208).expect("No frame");
    assert_eq!(frame.slot, None);
    assert_eq!(monitor.slot_text(1).as_deref(), Some("helper"));

    monitor.sink_mut().frames.clear();
    ret(&mut monitor, 0x210, 0x108);
    assert_eq!(monitor.slot_text(1).as_deref(), Some(""));
    let cleared: Vec<_> = (0..6).map(|i| (1, i, display::NUL)).collect();
    assert_eq!(monitor.sink().frames, cleared);

    call(&mut monitor, 0x10c, 0x200);
    assert_eq!(monitor.stack().top().and_then(|f| f.slot), Some(1));
    ret(&mut monitor, 0x210, 0x110);
    ret(&mut monitor, 0x120, 0x4);
    assert_eq!(monitor.depth(), 0);
    assert_eq!(monitor.stack().live_slots().count(), 0);
}

#[test]
fn balanced() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let targets = [0x100, 0x200, 0x280, 0x300, 0x200];
    for (n, target) in targets.iter().enumerate() {
        call(&mut monitor, 0x1000 + n as u32, *target);
        assert_eq!(monitor.depth(), n + 1);
    }
    for n in (0..targets.len()).rev() {
        ret(&mut monitor, 0x2000, 0x1004 + n as u32);
        assert_eq!(monitor.depth(), n);
    }
    assert_eq!(monitor.stack().live_slots().count(), 0);
    assert!((0..8).all(|s| monitor.slot_text(s).as_deref() == Some("")));
}

#[test]
fn underflow() {
    let mut monitor: Monitor = builder().build();
    assert_eq!(
        ret(&mut monitor, 0x200, 0x104),
        Some(Event::Return {
            target: 0x104,
            insn: Retired::new(0x200, RET),
        })
    );
    assert_eq!(monitor.depth(), 0);
    assert_eq!(monitor.exit(0x104), None);
    call(&mut monitor, 0x100, 0x200);
    assert_eq!(monitor.depth(), 1);
}

#[test]
fn return_elsewhere() {
    let mut monitor: Monitor = builder().build();
    call(&mut monitor, 0x100, 0x200);
    ret(&mut monitor, 0x204, 0x300);
    assert_eq!(monitor.depth(), 0);
}

#[test]
fn lagged_classification() {
    let mut monitor: Monitor = builder().build();
    assert_eq!(monitor.retire(0x100, JAL_RA), None);
    assert!(matches!(
        monitor.retire(0x200, NOP),
        Some(Event::Call { target: 0x200, .. })
    ));
    assert_eq!(monitor.retire(0x204, RET), None);
    assert!(matches!(
        monitor.retire(0x104, NOP),
        Some(Event::Return { target: 0x104, .. })
    ));
    assert_eq!(monitor.depth(), 0);
}

#[test]
fn previous_takes_precedence() {
    let mut monitor: Monitor = builder().build();
    monitor.retire(0x100, NOP);
    let event = call(&mut monitor, 0x50, 0x200);
    assert!(matches!(
        event,
        Some(Event::Call {
            return_addr: 0x54,
            ..
        })
    ));
}

#[test]
fn compressed() {
    let mut monitor: Monitor = builder().build();
    // c.jal is not acted upon
    assert_eq!(
        monitor.step(&ExecEvent::new(0x300, NOP).with_previous(0x100, 0x2041)),
        None
    );
    assert_eq!(monitor.depth(), 0);

    call(&mut monitor, 0x100, 0x300);
    assert_eq!(monitor.depth(), 1);
    // c.jr ra
    let event = monitor.step(&ExecEvent::new(0x104, NOP).with_previous(0x310, 0x8082));
    assert!(matches!(event, Some(Event::Return { target: 0x104, .. })));
    assert_eq!(monitor.depth(), 0);
    // c.jalr a5
    assert_eq!(
        monitor.step(&ExecEvent::new(0x400, NOP).with_previous(0x102, 0x9782)),
        None
    );
    assert_eq!(monitor.depth(), 0);
}

#[test]
fn ambiguous_is_call() {
    let mut monitor: Monitor = builder().build();
    // jalr t0,(ra)
    let event = monitor.step(&ExecEvent::new(0x300, NOP).with_previous(0x100, 0x000082e7));
    assert!(matches!(event, Some(Event::Call { .. })));
    assert_eq!(monitor.depth(), 1);
}

#[test]
fn interrupt() {
    let mut monitor: Monitor = builder().build();
    let event = monitor.step(
        &ExecEvent::new(0x80, NOP)
            .with_previous(0x100, JAL_RA)
            .with_interrupt(true),
    );
    assert_eq!(event, None);
    assert_eq!(monitor.depth(), 0);
}

#[test]
fn memory_write() {
    let mut monitor: Monitor = builder().build();
    let write = MemWrite {
        addr: 0x2000,
        data: 0xdeadbeef,
        mask: 0xf,
    };
    assert_eq!(monitor.step(&ExecEvent::new(0x100, 0x00112623).with_write(write)), None);
}

#[test]
fn remove_during_dispatch() {
    let mut monitor: Monitor = builder().build();
    let observers = monitor.observers();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let second: Rc<Cell<Option<ObserverId>>> = Default::default();

    let log = calls.clone();
    let victim = second.clone();
    monitor
        .add_entry_observer([0x200u64], move |_| {
            log.borrow_mut().push(1);
            if let Some(id) = victim.get() {
                assert!(observers.remove(id));
            }
        })
        .expect("Could not add observer");
    let log = calls.clone();
    let id = monitor
        .add_entry_observer([0x200u64], move |_| log.borrow_mut().push(2))
        .expect("Could not add observer");
    second.set(Some(id));

    monitor.enter(0x200, 0x104);
    assert_eq!(*calls.borrow(), [1]);
    assert_eq!(monitor.observers().len(), 1);
    assert!(!monitor.remove_observer(id));
}

#[test]
fn remove_self() {
    let mut monitor: Monitor = builder().build();
    let observers = monitor.observers();
    let count = Rc::new(Cell::new(0));
    let own: Rc<Cell<Option<ObserverId>>> = Default::default();

    let counter = count.clone();
    let this = own.clone();
    let id = monitor.add_exec_observer(move |_| {
        counter.set(counter.get() + 1);
        if let Some(id) = this.get() {
            observers.remove(id);
        }
    });
    own.set(Some(id));

    monitor.retire(0x100, NOP);
    monitor.retire(0x104, NOP);
    assert_eq!(count.get(), 1);
    assert!(monitor.observers().is_empty());
}

#[test]
fn add_during_dispatch() {
    let mut monitor: Monitor = builder().build();
    let observers = monitor.observers();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let log = calls.clone();
    monitor
        .add_entry_observer([0x200u64], move |frame| {
            log.borrow_mut().push(frame.entry);
            let inner = log.clone();
            observers.add_entry([0x200], move |_| inner.borrow_mut().push(0));
        })
        .expect("Could not add observer");

    monitor.enter(0x200, 0x104);
    assert_eq!(*calls.borrow(), [0x200]);
    monitor.enter(0x200, 0x104);
    assert_eq!(*calls.borrow(), [0x200, 0x200, 0]);
}

#[test]
fn exit_observer() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let exits = Rc::new(RefCell::new(Vec::new()));
    let log = exits.clone();
    monitor
        .add_exit_observer(["main", "helper"], move |frame| {
            log.borrow_mut().push(frame.name.clone())
        })
        .expect("Could not add observer");

    call(&mut monitor, 0x0, 0x100);
    call(&mut monitor, 0x104, 0x200);
    call(&mut monitor, 0x204, 0x280);
    ret(&mut monitor, 0x290, 0x208);
    ret(&mut monitor, 0x20c, 0x108);
    ret(&mut monitor, 0x10c, 0x4);
    assert_eq!(*exits.borrow(), ["helper", "main"]);
}

/// Sink appending slot updates to a log shared with observers
struct SharedLog(Rc<RefCell<Vec<(usize, char)>>>);

impl Sink for SharedLog {
    fn disasm_char(&mut self, _idx: usize, _ch: char) {}

    fn frame_char(&mut self, slot: usize, _idx: usize, ch: char) {
        self.0.borrow_mut().push((slot, ch));
    }
}

#[test]
fn exit_before_release() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = builder()
        .with_symbols(symbols())
        .with_sink(SharedLog(log.clone()))
        .build();
    let observed = log.clone();
    monitor
        .add_exit_observer(["main"], move |frame| {
            assert_eq!(frame.slot, Some(0));
            observed.borrow_mut().push((usize::MAX, '!'));
        })
        .expect("Could not add observer");

    call(&mut monitor, 0x0, 0x100);
    assert_eq!(monitor.stack().live_slots().collect::<Vec<_>>(), [0]);
    log.borrow_mut().clear();

    let frame = monitor.exit(0x4).expect("No frame");
    assert_eq!(frame.slot, Some(0));
    assert_eq!(log.borrow().first(), Some(&(usize::MAX, '!')));
    assert!(log.borrow()[1..].iter().all(|(slot, ch)| *slot == 0 && *ch == display::NUL));
    assert_eq!(monitor.stack().live_slots().count(), 0);
}

#[test]
fn exec_observer() {
    let mut monitor: Monitor = builder().build();
    let pcs = Rc::new(RefCell::new(Vec::new()));
    let log = pcs.clone();
    monitor.add_exec_observer(move |retired| log.borrow_mut().push(*retired));
    monitor.retire(0x100, NOP);
    monitor.retire(0x104, JAL_RA);
    assert_eq!(
        *pcs.borrow(),
        [Retired::from((0x100, NOP)), Retired::from((0x104, JAL_RA))]
    );
}

#[test]
fn waiter_drop() {
    let monitor = builder().with_symbols(symbols()).build();
    let entry = monitor.on_entry(["main"]).expect("Could not wait");
    let exit = monitor.on_exit([0x200u64]).expect("Could not wait");
    let exec = monitor.wait_until(["helper"], None).expect("Could not wait");
    assert_eq!(monitor.observers().len(), 3);
    drop(entry);
    assert_eq!(monitor.observers().len(), 2);
    assert!(monitor.remove_observer(exit.id()));
    drop(exit);
    drop(exec);
    assert!(monitor.observers().is_empty());
}

#[test]
fn wait_until() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let mut wait = monitor
        .wait_until([0x108u32, 0x200u32], Some(100))
        .expect("Could not wait");
    assert_eq!(wait.max_instructions(), Some(100));

    monitor.retire(0x100, NOP);
    monitor.retire(0x104, NOP);
    assert!(poll(&mut wait).is_pending());
    monitor.retire(0x108, NOP);
    monitor.retire(0x200, NOP);
    assert_eq!(poll(&mut wait), Poll::Ready(Some(0x108)));
    assert!(monitor.observers().is_empty());
}

#[test]
fn reset() {
    let mut monitor = builder()
        .with_symbols(symbols())
        .with_sink(Recorder::default())
        .with_trace_level(TraceLevel::All)
        .build();
    let mut wait = monitor.wait_until(["helper"], None).expect("Could not wait");
    let _observer = monitor.add_exec_observer(|_| ());

    monitor.write_reg(10, 5);
    monitor.retire(0x0, JAL_RA);
    monitor.retire(0x100, JAL_RA);
    assert_eq!(monitor.depth(), 1);
    monitor.reset();

    assert_eq!(poll(&mut wait), Poll::Ready(None));
    assert_eq!(monitor.depth(), 0);
    assert_eq!(monitor.reg(10), 0);
    assert_eq!(monitor.slot_text(0).as_deref(), Some(""));
    assert_eq!(monitor.disasm_text(), "");
    assert_eq!(monitor.observers().len(), 1);

    assert_eq!(monitor.retire(0x200, NOP), None);
    assert_eq!(monitor.depth(), 0);
}

#[test]
fn disassembly() {
    let mut monitor = builder()
        .with_sink(Recorder::default())
        .with_trace_level(TraceLevel::All)
        .build();
    assert_eq!(monitor.sink().levels, [TraceLevel::All]);

    monitor.retire(0x100, 0x00550513);
    assert_eq!(monitor.disasm_text(), "addi a0,a0,5");
    monitor.sink_mut().disasm.clear();

    monitor.retire(0x104, 0x00550593);
    assert_eq!(monitor.disasm_text(), "addi a1,a0,5");
    assert_eq!(monitor.sink().disasm, [(6, '1')]);

    monitor.sink_mut().disasm.clear();
    monitor.set_trace_level(TraceLevel::Calls);
    assert_eq!(monitor.trace_level(), TraceLevel::Calls);
    assert_eq!(monitor.disasm_text(), "");
    assert_eq!(monitor.sink().disasm.len(), 12);
    assert!(monitor.sink().disasm.iter().all(|(_, c)| *c == display::NUL));
    assert_eq!(monitor.sink().levels, [TraceLevel::All, TraceLevel::Calls]);

    monitor.retire(0x108, 0x00550513);
    assert_eq!(monitor.disasm_text(), "");
}

#[test]
fn truncated_names() {
    let config = Config {
        msg_size: 8,
        ..Default::default()
    };
    let mut monitor = builder()
        .with_symbols(symbols())
        .with_config(&config)
        .build();
    call(&mut monitor, 0x100, 0x280);
    assert_eq!(monitor.slot_text(0).as_deref(), Some("a_ver..."));
    assert_eq!(
        monitor.stack().top().map(|f| f.name.as_str()),
        Some("a_very_long_function_name")
    );
}

#[test]
fn params() {
    let mut monitor = builder().with_symbols(symbols()).build();
    let mut mem = memory::from_segment(b"helper\0").with_offset(0x2000);
    monitor.write_reg(10, 0x2000);
    monitor.write_reg(11, (-3i32) as u32);
    call(&mut monitor, 0x100, 0x200);
    monitor.write_reg(10, 0);

    let frame = monitor.stack().top().expect("No frame").clone();
    let mut params = frame.params(&mut mem, monitor.config().address_width);
    assert_eq!(params.next_str().as_deref(), Ok("helper"));
    assert_eq!(params.next_i32(), Ok(-3));

    let mut params = monitor.params(&mut mem);
    assert_eq!(params.next_u32(), Ok(0));
    assert_eq!(params.next_i8(), Ok(-3));
}

#[test]
fn text_field() {
    let mut field = display::TextField::new(8);
    let mut emitted = Vec::new();

    assert_eq!(field.width(), 8);
    field.set("hello", |i, c| emitted.push((i, c)));
    assert_eq!(emitted, [(0, 'h'), (1, 'e'), (2, 'l'), (3, 'l'), (4, 'o')]);

    emitted.clear();
    field.set("help", |i, c| emitted.push((i, c)));
    assert_eq!(emitted, [(3, 'p'), (4, display::NUL)]);
    assert_eq!(field.text(), "help");

    emitted.clear();
    field.set("helpless_hints", |i, c| emitted.push((i, c)));
    assert_eq!(field.text(), "helpl...");
    assert_eq!(emitted, vec![(4, 'l'), (5, '.'), (6, '.'), (7, '.')]);
}
