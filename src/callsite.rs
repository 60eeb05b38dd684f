//! Call-site trails for failure messages.
//!
//! A trail is captured only when an assertion fails. It lists the user frames
//! between the test entry point and the failing assertion, outermost first,
//! e.g. `basic.rs:41 -> helpers.rs:12`.

use backtrace::{Backtrace, BacktraceFrame, BacktraceSymbol};
use itertools::Itertools;
use std::path::{Path, PathBuf};

const MAX_DEPTH: usize = 50;

/// Frames from these crates end the trail.
const RUNTIME_PREFIXES: &[&str] = &["std::", "core::", "alloc::", "test::", "backtrace::"];

/// Frames of the assertion machinery itself, never shown.
const LIBRARY_PREFIXES: &[&str] = &["trail_assert::Assert", "trail_assert::callsite::callers"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub function: String,
    pub file: PathBuf,
    pub line: u32,
}

impl CallSite {
    fn from_symbol(symbol: &BacktraceSymbol) -> Self {
        Self {
            function: symbol.name().map(|n| format!("{n:#}")).unwrap_or_default(),
            file: symbol.filename().map(Path::to_path_buf).unwrap_or_default(),
            line: symbol.lineno().unwrap_or(0),
        }
    }

    fn is_runtime(&self) -> bool {
        let name = self.function.trim_start_matches('<');
        RUNTIME_PREFIXES.iter().any(|p| name.starts_with(p))
    }

    fn is_library(&self) -> bool {
        let name = self.function.trim_start_matches('<');
        LIBRARY_PREFIXES.iter().any(|p| {
            name.strip_prefix(p)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with([':', '<', '>', ' ']))
        })
    }

    fn render(&self, show_function: bool) -> String {
        let file = self.file.file_name().map(|f| f.to_string_lossy()).unwrap_or_default();
        if show_function {
            format!("{file}:{}:{}", self.line, function_base(&self.function))
        } else {
            format!("{file}:{}", self.line)
        }
    }
}

/// Last `::` segment of a function path, ignoring separators inside generic
/// arguments.
fn function_base(name: &str) -> &str {
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    &name[start..]
}

/// Outermost-first sequence of call sites. Index 0 is never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSites(pub Vec<CallSite>);

impl CallSites {
    pub fn render(&self, show_function: bool) -> String {
        self.0.iter().skip(1).map(|site| site.render(show_function)).join(" -> ")
    }
}

/// One entry per inlined function at this frame, innermost first.
fn frame_sites(frame: &BacktraceFrame) -> Vec<CallSite> {
    match frame.symbols() {
        [] => vec![CallSite::default()],
        symbols => symbols.iter().map(CallSite::from_symbol).collect(),
    }
}

/// Trim innermost-first sites down to user code: everything up to the
/// outermost library frame goes, the first runtime frame ends the list.
fn user_sites(sites: Vec<CallSite>) -> Vec<CallSite> {
    let start = match sites.iter().rposition(CallSite::is_library) {
        Some(i) => i + 1,
        None => sites.iter().position(|s| !s.is_runtime()).unwrap_or(sites.len()),
    };
    sites
        .into_iter()
        .skip(start)
        .take(MAX_DEPTH)
        .take_while(|site| !site.is_runtime())
        .collect()
}

/// Capture the trail leading to the user's assertion call.
#[inline(never)]
pub(crate) fn callers() -> CallSites {
    let mut trace = Backtrace::new_unresolved();
    assert!(!trace.frames().is_empty(), "trail-assert: zero callers found");
    trace.resolve();

    let sites = trace.frames().iter().flat_map(frame_sites).collect();
    let mut sites = user_sites(sites);
    sites.reverse();
    CallSites(sites)
}
