//! In-process instrumenting recorder
//!
//! Builds an invocation tree by timing closures. Every [`Recorder::measure`]
//! call becomes a child of whichever measurement is currently open, so nesting
//! `measure` calls mirrors the real call structure.
//!
//! # Example
//! ```
//! use dotprof::recorder::Recorder;
//!
//! let mut recorder = Recorder::new();
//! let sum = recorder.measure("demo::Math#sum", |r| {
//!     r.measure("demo::Math#square", |_| 3 * 3) + 1
//! });
//! assert_eq!(sum, 10);
//!
//! let profile = recorder.finish();
//! assert_eq!(profile.root.children.len(), 1);
//! assert_eq!(profile.root.children[0].children.len(), 1);
//! ```

use crate::invocation::{Invocation, MethodNames, Profile, ROOT_NAME, ROOT_SERIAL};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Frame {
    serial: u64,
    start: Instant,
    children: Vec<Invocation>,
}

impl Frame {
    fn open(serial: u64) -> Self {
        Self {
            serial,
            start: Instant::now(),
            children: Vec::new(),
        }
    }

    fn close(self, elapsed: Duration) -> Invocation {
        let mut duration_ns = duration_to_ns(elapsed);
        // Clock granularity can make a parent look shorter than its children.
        duration_ns = duration_ns.max(children_ns(&self.children));
        Invocation::new(self.serial, duration_ns, self.children)
    }
}

fn duration_to_ns(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

fn children_ns(children: &[Invocation]) -> i64 {
    children
        .iter()
        .fold(0i64, |acc, c| acc.saturating_add(c.duration_ns))
}

/// Records timed invocations into a [`Profile`]
#[derive(Debug)]
pub struct Recorder {
    names: MethodNames,
    serials: HashMap<String, u64>,
    next_serial: u64,
    stack: Vec<Frame>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Start recording; the synthetic root is opened immediately
    pub fn new() -> Self {
        let mut names = MethodNames::new();
        names.insert(ROOT_SERIAL, ROOT_NAME);
        Self {
            names,
            serials: HashMap::new(),
            next_serial: ROOT_SERIAL + 1,
            stack: vec![Frame::open(ROOT_SERIAL)],
        }
    }

    /// Serial for `name`, assigned in first-seen order
    pub fn serial_for(&mut self, name: &str) -> u64 {
        if let Some(&serial) = self.serials.get(name) {
            return serial;
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.serials.insert(name.to_string(), serial);
        self.names.insert(serial, name);
        serial
    }

    /// Time `f` as an invocation of `name`
    pub fn measure<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let serial = self.serial_for(name);
        self.stack.push(Frame::open(serial));
        let depth = self.stack.len();

        let result = f(self);

        debug_assert_eq!(self.stack.len(), depth);
        if let Some(frame) = self.stack.pop() {
            let elapsed = frame.start.elapsed();
            let invocation = frame.close(elapsed);
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(invocation);
            }
        }
        result
    }

    /// Number of distinct methods seen so far, the root included
    pub fn method_count(&self) -> usize {
        self.names.len()
    }

    /// Close the root and hand back the recorded profile
    pub fn finish(mut self) -> Profile {
        let root = match self.stack.drain(..).next() {
            Some(frame) => {
                let elapsed = frame.start.elapsed();
                frame.close(elapsed)
            }
            None => Invocation::leaf(ROOT_SERIAL, 0),
        };
        tracing::debug!(
            invocations = root.count(),
            methods = self.names.len(),
            "recording finished"
        );
        Profile::new(root, self.names)
    }
}
