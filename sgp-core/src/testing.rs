//! Test doubles shared by the unit tests: a scripted bus, a recording timer
//! and a minimal executor.

extern crate std;

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use sgp_proto::encode_word;

use crate::bus::{BusError, SensorBus};

/// Run a future to completion (simple blocking executor).
pub fn block_on<F: Future>(mut f: F) -> F::Output {
    fn noop_raw_waker() -> RawWaker {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        RawWaker::new(core::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);

    // SAFETY: We don't move f after pinning
    let mut f = unsafe { Pin::new_unchecked(&mut f) };

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {
                panic!("Mock future returned Pending unexpectedly");
            }
        }
    }
}

/// One scripted bus transaction.
#[derive(Debug, Clone)]
pub enum Step {
    Write(Result<(), BusError>),
    Read(Result<Vec<u8>, BusError>),
}

/// Bus that replays a script and records every write.
#[derive(Default)]
pub struct MockBus {
    pub script: VecDeque<Step>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: usize,
}

impl MockBus {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Written command codes, in order.
    pub fn codes(&self) -> Vec<[u8; 2]> {
        self.writes.iter().map(|(_, b)| [b[0], b[1]]).collect()
    }
}

impl SensorBus for MockBus {
    async fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError> {
        match self.script.pop_front() {
            Some(Step::Write(result)) => {
                self.writes.push((address, bytes.to_vec()));
                result
            }
            other => panic!("unexpected write {bytes:02x?}, script had {other:?}"),
        }
    }

    async fn read(&mut self, _address: u8, buf: &mut [u8]) -> Result<usize, BusError> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Step::Read(result)) => {
                let data = result?;
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            other => panic!("unexpected read, script had {other:?}"),
        }
    }
}

/// Timer that returns immediately and records each requested wait.
#[derive(Default)]
pub struct MockDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

/// Successful write step.
pub fn ack() -> Step {
    Step::Write(Ok(()))
}

/// Read step returning the given words with correct checksums.
pub fn words(values: &[u16]) -> Step {
    Step::Read(Ok(values.iter().flat_map(|&v| encode_word(v)).collect()))
}
