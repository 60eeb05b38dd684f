use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crate::errors::{AssertError, Result};

/// The failure and scheduling primitives of the host test framework.
pub trait TestHandle {
    /// Mark the test failed and keep running.
    fn fail(&self);

    /// Mark the test failed and stop it. Never returns.
    fn fail_now(&self) -> !;

    /// Tell the framework this test may run alongside its siblings.
    fn mark_parallel(&self);
}

/// Test handle for libtest.
///
/// Hard failures panic, which is how libtest fails a test. Soft failures are
/// counted and surface when the run is finished or dropped.
#[derive(Debug, Default)]
pub struct TestRun {
    name: String,
    failures: AtomicUsize,
    parallel: AtomicBool,
    finished: AtomicBool,
}

impl TestRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: AtomicUsize::new(0),
            parallel: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> bool {
        self.failures() > 0
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel.load(Ordering::SeqCst)
    }

    /// Close the run, reporting any soft failures as an error.
    pub fn finish(&self) -> Result<()> {
        self.finished.store(true, Ordering::SeqCst);
        match self.failures() {
            0 => Ok(()),
            failures => Err(AssertError::Failed { test: self.name.clone(), failures }),
        }
    }
}

impl TestHandle for TestRun {
    fn fail(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn fail_now(&self) -> ! {
        self.fail();
        // the panic is the failure report; don't raise a second one on drop
        self.finished.store(true, Ordering::SeqCst);
        panic!("{}: failed", self.name);
    }

    fn mark_parallel(&self) {
        tracing::debug!(test = %self.name, "test marked parallel");
        self.parallel.store(true, Ordering::SeqCst);
    }
}

impl Drop for TestRun {
    fn drop(&mut self) {
        if self.finished.load(Ordering::SeqCst) || thread::panicking() {
            return;
        }
        if let Err(e) = self.finish() {
            panic!("{e}");
        }
    }
}
