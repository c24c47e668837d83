//! Line source — streams logical lines out of a file or standard input
//!
//! The reader owns a single growable byte buffer. A line that does not fit
//! doubles the buffer; bytes already read are kept in place and reading
//! resumes right after them, so a long line is never split or truncated.
//!
//! For regular files the longest line is measured up front and the buffer is
//! sized to fit it, so the file is read without any growth.
//!
//! Lines are raw bytes on the wire. Bytes that are not valid UTF-8 are
//! replaced with U+FFFD rather than rejected.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info, trace, warn};

use crate::{Error, Result};

/// Starting buffer size for input whose line lengths are unknown
pub const DEFAULT_CAPACITY: usize = 196;

/// Where input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Interpret a command-line argument; `-` means standard input
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One logical line with its newline stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based physical line number
    pub number: usize,
    pub text: String,
}

/// Incremental line reader over any byte stream
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Start of unconsumed bytes in `buf`
    start: usize,
    /// End of valid bytes in `buf`
    end: usize,
    line: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    /// Create a reader with the default buffer capacity
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// Create a reader with an explicit starting buffer capacity
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        LineReader {
            inner,
            buf: vec![0; capacity.max(1)],
            start: 0,
            end: 0,
            line: 0,
            eof: false,
        }
    }

    /// Current buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of physical lines consumed so far, empty ones included
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Return the next non-empty line, or `None` at end of input
    pub fn next_line(&mut self) -> Result<Option<Line>> {
        loop {
            let pending = &self.buf[self.start..self.end];
            let (raw_start, raw_end) = match pending.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let span = (self.start, self.start + pos);
                    self.start += pos + 1;
                    span
                }
                None if self.eof => {
                    if self.start == self.end {
                        return Ok(None);
                    }
                    // Last line without a trailing newline
                    let span = (self.start, self.end);
                    self.start = self.end;
                    span
                }
                None => {
                    self.fill()?;
                    continue;
                }
            };

            self.line += 1;
            let mut bytes = &self.buf[raw_start..raw_end];
            if let [rest @ .., b'\r'] = bytes {
                bytes = rest;
            }
            if bytes.is_empty() {
                trace!("line {}: empty", self.line);
                continue;
            }

            let text = String::from_utf8_lossy(bytes);
            if matches!(text, Cow::Owned(_)) {
                warn!("line {}: invalid UTF-8 replaced with U+FFFD", self.line);
            }
            return Ok(Some(Line {
                number: self.line,
                text: text.into_owned(),
            }));
        }
    }

    /// Read more bytes, compacting first and doubling when the buffer is full
    fn fill(&mut self) -> Result<()> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.end == self.buf.len() {
            let grown = self.buf.len() * 2;
            debug!("line buffer full at {} bytes, growing to {}", self.buf.len(), grown);
            self.buf.resize(grown, 0);
        }

        loop {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.end += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
            return Ok(());
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Open a source for line-by-line reading
///
/// Regular files are pre-scanned for their longest line and rewound, so the
/// buffer never needs to grow. Standard input, pipes and other non-seekable
/// files start at [`DEFAULT_CAPACITY`].
///
/// # Errors
/// Returns `Open` if the file cannot be opened and `Io` if the pre-scan or
/// rewind fails.
pub fn open(source: &Source) -> Result<LineReader<Box<dyn Read>>> {
    match source {
        Source::Stdin => {
            let stdin: Box<dyn Read> = Box::new(io::stdin().lock());
            Ok(LineReader::new(stdin))
        }
        Source::File(path) => open_file(path),
    }
}

fn open_file(path: &Path) -> Result<LineReader<Box<dyn Read>>> {
    let mut file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if !file.metadata()?.is_file() {
        debug!("{} is not a regular file, skipping pre-scan", path.display());
        let inner: Box<dyn Read> = Box::new(file);
        return Ok(LineReader::new(inner));
    }

    let longest = longest_line(&mut file)?;
    file.seek(SeekFrom::Start(0))?;
    info!("Maximum line length is {}", longest);

    let inner: Box<dyn Read> = Box::new(file);
    Ok(LineReader::with_capacity(inner, longest + 1))
}

/// Length in bytes of the longest line, its newline included
pub fn longest_line<R: Read>(inner: R) -> io::Result<usize> {
    let mut reader = BufReader::new(inner);
    let mut longest = 0;
    let mut current = 0;

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        for &byte in chunk {
            current += 1;
            if byte == b'\n' {
                longest = longest.max(current);
                current = 0;
            }
        }
        let consumed = chunk.len();
        reader.consume(consumed);
    }

    Ok(longest.max(current))
}
