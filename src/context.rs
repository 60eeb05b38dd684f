use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Shared output sink. Derived contexts write to the same sink as their parent.
pub type Sink = Arc<Mutex<dyn Write + Send>>;

/// Flags and output sink of an assertion context.
#[derive(Clone)]
pub struct Config {
    pub(crate) out: Sink,
    pub(crate) fail_fast: bool,
    pub(crate) no_defaults: bool,
    pub(crate) show_function: bool,
    pub(crate) parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out: Arc::new(Mutex::new(io::stdout())),
            fail_fast: false,
            no_defaults: false,
            show_function: false,
            parallel: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("fail_fast", &self.fail_fast)
            .field("no_defaults", &self.no_defaults)
            .field("show_function", &self.show_function)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn set_fail_fast(&mut self, on: bool) {
        self.fail_fast = on;
    }

    pub fn set_no_defaults(&mut self, on: bool) {
        self.no_defaults = on;
    }

    pub fn set_show_function(&mut self, on: bool) {
        self.show_function = on;
    }

    pub fn set_parallel(&mut self, on: bool) {
        self.parallel = on;
    }

    pub fn set_output<W: Write + Send + 'static>(&mut self, w: W) {
        self.out = Arc::new(Mutex::new(w));
    }

    pub(crate) fn apply<I>(&mut self, opts: I)
    where
        I: IntoIterator<Item = AssertOption>,
    {
        for opt in opts {
            (opt.0)(self);
        }
    }
}

/// One configuration step. Options run in the order given; the last one to
/// touch a field wins.
pub struct AssertOption(Box<dyn FnOnce(&mut Config)>);

impl AssertOption {
    pub fn new<F: FnOnce(&mut Config) + 'static>(f: F) -> Self {
        Self(Box::new(f))
    }
}

impl fmt::Debug for AssertOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AssertOption")
    }
}

/// Abort the current test on the first failed assertion.
pub fn fail_fast() -> AssertOption {
    AssertOption::new(|c| c.fail_fast = true)
}

/// Skip the default comparison options in `equal`.
pub fn no_defaults() -> AssertOption {
    AssertOption::new(|c| c.no_defaults = true)
}

/// Mark the test parallel-eligible when the context is built.
pub fn parallel() -> AssertOption {
    AssertOption::new(|c| c.parallel = true)
}

/// Print function names in call-site trails.
pub fn show_function() -> AssertOption {
    AssertOption::new(|c| c.show_function = true)
}

/// Send failure messages to `w` instead of standard output.
pub fn set_output<W: Write + Send + 'static>(w: W) -> AssertOption {
    AssertOption::new(move |c| c.set_output(w))
}
