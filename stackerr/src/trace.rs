//! Call-stack capture
//!
//! Every [`Error`](crate::Error) records a short, resolved slice of the stack
//! ([`CAPTURE_DEPTH`] frames, starting at the caller of the public
//! constructor) plus the unresolved program counters of the whole stack. The
//! short slice is serialized with the error; the full walk is only resolved
//! on demand and never leaves the process.

use std::fmt;
use std::panic::Location;
use std::path::Path;

use backtrace::{Backtrace, BacktraceFrame};
use serde::{Deserialize, Serialize};

/// Number of resolved frames stored on every error.
pub const CAPTURE_DEPTH: usize = 2;

/// Symbols that belong to the capture machinery or to the constructors.
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "stackerr::trace::capture",
    "stackerr::trace::resolve",
    "stackerr::error::Error::",
    "stackerr::error::Error>::",
    "stackerr::wrap",
];

/// One captured stack frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub index: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: u32,
}

fn is_zero(line: &u32) -> bool {
    *line == 0
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}:{} {}", self.index, self.file, self.line, self.function)
    }
}

/// An ordered list of [`Trace`]s, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackTrace(Vec<Trace>);

impl StackTrace {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self(traces)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trace> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Trace] {
        &self.0
    }

    /// Each trace rendered on its own, without separators.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(Trace::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a StackTrace {
    type Item = &'a Trace;
    type IntoIter = std::slice::Iter<'a, Trace>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for trace in &self.0 {
            writeln!(f, "{}", trace)?;
        }
        Ok(())
    }
}

/// Result of a capture at construction time.
pub(crate) struct Capture {
    pub frames: StackTrace,
    pub backtrace: Backtrace,
}

/// Capture the stack at `location`.
///
/// Frame 0 is the symbol at `location`, the call site of the public
/// constructor. When no resolved symbol sits there (no debug info, or the
/// caller's frame was folded into a tail call) the first symbol past the
/// library's own frames is used instead, and its missing file and line are
/// taken from `location`. Without any symbol information the capture is a
/// single frame built from `location`.
pub(crate) fn capture(location: &'static Location<'static>) -> Capture {
    let backtrace = Backtrace::new_unresolved();
    let raw = backtrace.frames();

    let mut symbols: Vec<(usize, Trace)> = Vec::new();
    let mut anchor = None;
    for (pos, frame) in raw.iter().enumerate() {
        for symbol in resolve(frame) {
            if anchor.is_none() && is_call_site(&symbol, location) {
                anchor = Some(symbols.len());
            }
            symbols.push((pos, symbol));
        }
        if anchor.is_some_and(|at| symbols.len() >= at + CAPTURE_DEPTH) {
            break;
        }
    }
    let anchor = anchor
        .or_else(|| same_file(&symbols, location))
        .or_else(|| past_internal(&symbols));

    let mut traces: Vec<Trace> = anchor
        .map(|at| {
            symbols[at..]
                .iter()
                .take(CAPTURE_DEPTH)
                .enumerate()
                .map(|(index, (_, symbol))| Trace {
                    index,
                    ..symbol.clone()
                })
                .collect()
        })
        .unwrap_or_default();

    match traces.first_mut() {
        Some(first) => fill_missing(first, location.file(), location.line()),
        None => traces.push(Trace {
            index: 0,
            function: String::new(),
            file: location.file().to_string(),
            line: location.line(),
        }),
    }

    let backtrace = match anchor {
        Some(at) => Backtrace::from(raw[symbols[at].0..].to_vec()),
        None => backtrace,
    };

    Capture {
        frames: StackTrace::new(traces),
        backtrace,
    }
}

/// Builds without line tables resolve names only.
fn fill_missing(trace: &mut Trace, file: &str, line: u32) {
    if trace.file.is_empty() || trace.line == 0 {
        trace.file = file.to_string();
        trace.line = line;
    }
}

/// Whether `symbol` is the exact call site recorded by `#[track_caller]`.
fn is_call_site(symbol: &Trace, location: &Location<'_>) -> bool {
    symbol.line == location.line()
        && !is_internal(&symbol.function)
        && in_file(symbol, location)
}

fn in_file(symbol: &Trace, location: &Location<'_>) -> bool {
    !symbol.file.is_empty() && Path::new(&symbol.file).ends_with(location.file())
}

/// First non-library symbol in the caller's file. Covers call expressions
/// spanning several lines, where debug info points at a later line.
fn same_file(symbols: &[(usize, Trace)], location: &Location<'_>) -> Option<usize> {
    symbols
        .iter()
        .position(|(_, symbol)| !is_internal(&symbol.function) && in_file(symbol, location))
}

/// First symbol after the library's own frames, by name.
fn past_internal(symbols: &[(usize, Trace)]) -> Option<usize> {
    let first_internal = symbols
        .iter()
        .position(|(_, symbol)| is_internal(&symbol.function))?;
    symbols[first_internal..]
        .iter()
        .position(|(_, symbol)| !is_internal(&symbol.function))
        .map(|offset| first_internal + offset)
}

/// Resolve every (possibly inlined) symbol of one physical frame.
fn resolve(frame: &BacktraceFrame) -> Vec<Trace> {
    let mut symbols = Vec::new();
    backtrace::resolve(frame.ip(), |symbol| {
        symbols.push(Trace {
            index: 0,
            function: symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_default(),
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            line: symbol.lineno().unwrap_or(0),
        });
    });
    symbols
}

/// Library symbols, in both the legacy (`stackerr::error::Error::new`) and
/// the v0 (`<stackerr::error::Error>::new`) demangled forms.
fn is_internal(function: &str) -> bool {
    let path = function.strip_prefix('<').unwrap_or(function);
    INTERNAL_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || function.contains(" as stackerr::ext::ResultExt")
}

/// Resolve a full-depth walk into traces, one per logical frame.
///
/// Library symbols inlined into the first frame are dropped, and a first
/// trace without location info takes it from `head`, the frame stored at
/// capture time.
pub(crate) fn walk(backtrace: &Backtrace, head: Option<&Trace>) -> Vec<Trace> {
    let mut resolved = backtrace.clone();
    resolved.resolve();

    let mut traces: Vec<Trace> = Vec::new();
    for frame in resolved.frames() {
        for symbol in frame.symbols() {
            let function = symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_default();
            if traces.is_empty() && is_internal(&function) {
                continue;
            }
            traces.push(Trace {
                index: traces.len(),
                function,
                file: symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
                line: symbol.lineno().unwrap_or(0),
            });
        }
    }

    if let (Some(first), Some(head)) = (traces.first_mut(), head) {
        fill_missing(first, &head.file, head.line);
    }
    traces
}
