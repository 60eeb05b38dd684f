//! Structural difference between two `Debug` values.
//!
//! Both values are rendered to text and compared line by line. The result
//! uses the `-x +y` convention: lines only in `x` start with `- `, lines only
//! in `y` start with `+ `, unchanged context lines start with two spaces.

use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt::Debug;

const DEFAULT_CONTEXT: usize = 3;

/// Knobs for [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmpOption {
    /// Render every nested field on its own line (`{:#?}`). Without it values
    /// are rendered compactly and differ as a whole.
    Expand,
    /// Leave a field, and anything nested under it, out of the comparison.
    /// Only applies to expanded renderings.
    IgnoreField(String),
    /// Unchanged lines kept around each change.
    Context(usize),
}

/// Options `equal` prepends unless the context was built with `no_defaults`.
pub(crate) fn default_options() -> Vec<CmpOption> {
    vec![CmpOption::Expand]
}

struct Settings<'a> {
    expand: bool,
    ignored: Vec<&'a str>,
    context: usize,
}

impl<'a> Settings<'a> {
    fn from_options(opts: &'a [CmpOption]) -> Self {
        let mut s = Settings { expand: false, ignored: Vec::new(), context: DEFAULT_CONTEXT };
        for opt in opts {
            match opt {
                CmpOption::Expand => s.expand = true,
                CmpOption::IgnoreField(name) => s.ignored.push(name),
                CmpOption::Context(n) => s.context = *n,
            }
        }
        s
    }

    fn render<T: Debug + ?Sized>(&self, value: &T) -> String {
        let mut text = if self.expand {
            let pretty = format!("{value:#?}");
            if self.ignored.is_empty() { pretty } else { strip_fields(&pretty, &self.ignored) }
        } else {
            format!("{value:?}")
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

/// Drop `name: ...` lines from a pretty `Debug` rendering, including the
/// block that follows when the value spans several lines.
fn strip_fields(text: &str, fields: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut block: Option<usize> = None;
    for line in text.lines() {
        let body = line.trim_start();
        let indent = line.len() - body.len();
        if let Some(depth) = block {
            if indent > depth {
                continue;
            }
            block = None;
            if indent == depth && body.starts_with(['}', ']', ')']) {
                continue;
            }
        }
        let ignored = fields.iter().any(|f| {
            body.strip_prefix(f).is_some_and(|rest| rest.starts_with(": "))
        });
        if ignored {
            if body.ends_with(['{', '[', '(']) {
                block = Some(indent);
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Textual difference between `x` and `y`; empty when they render the same.
pub fn diff<X, Y>(x: &X, y: &Y, opts: &[CmpOption]) -> String
where
    X: Debug + ?Sized,
    Y: Debug + ?Sized,
{
    let settings = Settings::from_options(opts);
    let left = settings.render(x);
    let right = settings.render(y);
    if left == right {
        return String::new();
    }

    let text = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(&left, &right);

    let mut out = String::new();
    for (i, group) in text.grouped_ops(settings.context).iter().enumerate() {
        if i > 0 {
            out.push_str("  ...\n");
        }
        for op in group {
            for change in text.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "- ",
                    ChangeTag::Insert => "+ ",
                    ChangeTag::Equal => "  ",
                };
                out.push_str(sign);
                out.push_str(change.value());
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }
    out
}
