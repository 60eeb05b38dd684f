//! Small test assertions that report where they failed.
//!
//! ```ignore
//! let run = TestRun::new("parses_header");
//! let is = Assert::new(&run, [fail_fast()]);
//! is.equal(&parse(input), &expected);
//! ```
//!
//! A failed assertion prints a compact call-site trail followed by the reason,
//! e.g. `[parser.rs:88 -> helpers.rs:12] not true`, then fails the test
//! softly or, with `fail_fast`, stops it.

pub mod callsite;
pub mod context;
pub mod diff;
pub mod errors;
pub mod handle;

use std::fmt::{Debug, Display};
use std::sync::PoisonError;

pub use callsite::{CallSite, CallSites};
pub use context::{fail_fast, no_defaults, parallel, set_output, show_function, AssertOption, Config};
pub use diff::{diff, CmpOption};
pub use errors::{AssertError, Result};
pub use handle::{TestHandle, TestRun};

use callsite::callers;

/// Assertion context for one test.
#[derive(Clone)]
pub struct Assert<'t> {
    handle: &'t dyn TestHandle,
    config: Config,
}

impl<'t> Assert<'t> {
    pub fn new<I>(handle: &'t dyn TestHandle, opts: I) -> Self
    where
        I: IntoIterator<Item = AssertOption>,
    {
        Self::build(handle, Config::default(), opts)
    }

    /// Context for a sub-test. Starts from this context's flags and sink.
    pub fn derive<'u, I>(&self, handle: &'u dyn TestHandle, opts: I) -> Assert<'u>
    where
        I: IntoIterator<Item = AssertOption>,
    {
        Assert::build(handle, self.config.clone(), opts)
    }

    fn build<I>(handle: &'t dyn TestHandle, mut config: Config, opts: I) -> Self
    where
        I: IntoIterator<Item = AssertOption>,
    {
        config.apply(opts);
        tracing::debug!(?config, "assertion context ready");
        if config.parallel {
            handle.mark_parallel();
        }
        Self { handle, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_fail_fast(&self) -> bool {
        self.config.fail_fast
    }

    pub fn is_no_defaults(&self) -> bool {
        self.config.no_defaults
    }

    pub fn is_show_function(&self) -> bool {
        self.config.show_function
    }

    pub fn is_parallel(&self) -> bool {
        self.config.parallel
    }

    /// Fails unless `expression` holds.
    pub fn is_true(&self, expression: bool) {
        if expression {
            return;
        }
        self.report("not true\n");
    }

    /// Fails when `x` and `y` differ structurally.
    pub fn equal<X, Y>(&self, x: &X, y: &Y)
    where
        X: Debug + ?Sized,
        Y: Debug + ?Sized,
    {
        self.compare(x, y, &[]);
    }

    /// Like [`Assert::equal`] with extra comparison options. The defaults
    /// come first unless the context was built with `no_defaults`.
    pub fn equal_with<X, Y>(&self, x: &X, y: &Y, opts: &[CmpOption])
    where
        X: Debug + ?Sized,
        Y: Debug + ?Sized,
    {
        self.compare(x, y, opts);
    }

    /// Fails when `result` holds an error.
    pub fn no_err<T, E: Display>(&self, result: &std::result::Result<T, E>) {
        if let Err(err) = result {
            self.report(&format!("err: {err}\n"));
        }
    }

    /// Always fails.
    pub fn fail(&self) {
        self.report("failed\n");
    }

    fn compare<X, Y>(&self, x: &X, y: &Y, opts: &[CmpOption])
    where
        X: Debug + ?Sized,
        Y: Debug + ?Sized,
    {
        let opts = if self.config.no_defaults {
            opts.to_vec()
        } else {
            let mut all = diff::default_options();
            all.extend_from_slice(opts);
            all
        };
        let d = diff(x, y, &opts);
        if d.is_empty() {
            return;
        }
        self.report(&format!("diff -x +y\n{d}"));
    }

    /// Print the trail and `body`, then escalate.
    #[inline(never)]
    fn report(&self, body: &str) {
        let trail = callers().render(self.config.show_function);
        self.write(&format!("[{trail}] {body}"));
        self.escalate();
    }

    fn write(&self, msg: &str) {
        let mut out = self.config.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(msg.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %AssertError::from(e), "failed to write assertion message");
        }
    }

    fn escalate(&self) {
        tracing::debug!(fail_fast = self.config.fail_fast, "assertion failed");
        if self.config.fail_fast {
            self.handle.fail_now();
        }
        self.handle.fail();
    }
}

impl Debug for Assert<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assert").field("config", &self.config).finish_non_exhaustive()
    }
}
