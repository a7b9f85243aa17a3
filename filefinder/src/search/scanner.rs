use crossbeam_channel::Sender;
use memchr::memmem;
use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

use crate::metrics::SearchMetrics;
use crate::tree::FileTree;

const BUFFER_CAPACITY: usize = 64 * 1024;
const LINE_CAPACITY: usize = 256;
/// Longest line that is searched; a longer one fails the read of its file
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Literal, case-sensitive substring test applied line by line
#[derive(Debug, Clone)]
pub struct WordMatcher {
    finder: memmem::Finder<'static>,
}

impl WordMatcher {
    pub fn new(word: &str) -> Self {
        Self {
            finder: memmem::Finder::new(word.as_bytes()).into_owned(),
        }
    }

    /// Whether a single line (without its terminator) contains the word
    pub fn matches_line(&self, line: &[u8]) -> bool {
        self.finder.find(line).is_some()
    }

    /// Reads `reader` line by line and stops at the first line containing the word.
    ///
    /// Lines are split on `\n` and a trailing `\r` is dropped. An input without
    /// any line, i.e. an empty file, never matches. A line longer than
    /// [`MAX_LINE_LENGTH`] bytes is an `InvalidData` error, so memory use stays
    /// bounded on inputs without line breaks.
    pub fn matches_reader<R: Read>(&self, reader: R) -> io::Result<bool> {
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, reader);
        let mut line = Vec::with_capacity(LINE_CAPACITY);
        loop {
            line.clear();
            let read = reader
                .by_ref()
                .take(MAX_LINE_LENGTH as u64 + 1)
                .read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(false);
            }
            if line.len() > MAX_LINE_LENGTH && !line.ends_with(b"\n") {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line longer than {MAX_LINE_LENGTH} bytes"),
                ));
            }
            if self.matches_line(trim_line_ending(&line)) {
                return Ok(true);
            }
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Matched,
    NoMatch,
    OpenFailed,
    ReadFailed,
}

/// Scans single files and reports matching ones to the shared sink
#[derive(Debug, Clone)]
pub struct ContentScanner {
    matcher: Arc<WordMatcher>,
    sink: Sender<PathBuf>,
    metrics: SearchMetrics,
}

impl ContentScanner {
    pub fn new(matcher: Arc<WordMatcher>, sink: Sender<PathBuf>, metrics: SearchMetrics) -> Self {
        Self {
            matcher,
            sink,
            metrics,
        }
    }

    /// Scans `name` inside `tree` and sends `dir/name` to the sink if it matches.
    ///
    /// Open and read failures are not errors: the file simply does not match.
    pub fn scan_file<T: FileTree>(&self, tree: &T, dir: &Path, name: &OsStr) -> ScanOutcome {
        let path = dir.join(name);
        trace!("Scanning file: {}", path.display());

        let file = match tree.open(name) {
            Ok(file) => file,
            Err(e) => {
                trace!("Skipping {}: {}", path.display(), e);
                self.metrics.record_open_failure();
                return ScanOutcome::OpenFailed;
            }
        };

        match self.matcher.matches_reader(file) {
            Ok(true) => {
                self.metrics.record_scanned(true);
                // a closed receiver means the caller stopped listening
                if self.sink.send(path).is_err() {
                    trace!("Result receiver dropped, discarding match");
                }
                ScanOutcome::Matched
            }
            Ok(false) => {
                self.metrics.record_scanned(false);
                ScanOutcome::NoMatch
            }
            Err(e) => {
                trace!("Read failed for {}: {}", path.display(), e);
                self.metrics.record_read_failure();
                ScanOutcome::ReadFailed
            }
        }
    }
}
