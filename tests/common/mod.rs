#![allow(dead_code)]

use std::cell::Cell;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use trail_assert::TestHandle;

/// Sink that keeps everything written to it.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that rejects every write.
pub struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Handle that counts calls instead of failing the real test.
#[derive(Default)]
pub struct Recorder {
    pub fails: Cell<usize>,
    pub fatal: Cell<usize>,
    pub parallel: Cell<usize>,
}

impl TestHandle for Recorder {
    fn fail(&self) {
        self.fails.set(self.fails.get() + 1);
    }

    fn fail_now(&self) -> ! {
        self.fatal.set(self.fatal.get() + 1);
        panic!("fail_now");
    }

    fn mark_parallel(&self) {
        self.parallel.set(self.parallel.get() + 1);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
