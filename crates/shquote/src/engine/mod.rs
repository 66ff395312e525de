//! The quoting state machine and record delimiter loop.
//!
//! Overview
//! - One record (a command-line argument, or a NUL-delimited stdin chunk)
//!   is escaped at a time. Within a record the machine moves between three
//!   states: copying literal runs unquoted (`Idle`), a plain single-quoted
//!   run (`RawQuoted`, the only quoting in minimal mode), and an ANSI-C
//!   `$'...'` run (`AnsiQuoted`).
//! - Runs concatenate with no separator; a shell reads adjacent quoted and
//!   unquoted segments back as one word. The machine exploits that freely:
//!   a record like `a<newline>b` becomes `a$'\nb'`.
//! - Once a `$'` run opens it stays open to the end of the record, with one
//!   exception: a variable-width `\U` escape followed by an ASCII hex digit
//!   closes the run so the shell cannot absorb the digit into the escape.
//!   A raw run closes at an embedded quote (`'` cannot be escaped inside
//!   single quotes) and at end of record.
//! - The record loop owns the delimiter policy: space or NUL between
//!   records, optional flush after each separator, and the trailing
//!   terminator rules (see [`StreamOptions`]).
//!
//! Edge cases pinned down by tests
//! - An empty record, and an entirely empty input stream, emit `''`.
//! - A `'` met while unquoted is emitted as `\'` without opening a run.
//! - A record-leading `~` is force-quoted even though `~` is not a
//!   metacharacter elsewhere (tilde expansion survives quote removal
//!   otherwise). The guard re-arms at every segment start in
//!   ignore-null-input mode.

use std::io::{Read, Write};

use crate::{
    classify,
    error::EngineError,
    escape::select_escape,
    options::{Encoding, StreamOptions},
    source::{ByteSource, Unit, UnitSource, Utf8Source},
};

/// Escapes everything from `input` into `output` under `opts`.
///
/// This is the whole engine: it runs to stream exhaustion or the first
/// fatal I/O error, and flushes the sink before returning.
///
/// # Errors
///
/// [`EngineError::Read`] / [`EngineError::Write`] on I/O failure. Malformed
/// input bytes are not errors (they are escaped byte-wise).
pub fn escape_stream<R: Read, W: Write>(
    input: R,
    output: W,
    opts: StreamOptions,
) -> Result<(), EngineError> {
    match opts.escape.encoding {
        Encoding::Bytes => Engine::new(ByteSource::new(input), output, opts).run(),
        Encoding::Utf8 => Engine::new(Utf8Source::new(input), output, opts).run(),
    }
}

/// What ended a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordEnd {
    /// A NUL separator; more records may follow.
    Nul,
    /// End of the input stream.
    Eof,
}

/// Drives a [`UnitSource`] through the quoting state machine into a writer.
///
/// [`escape_stream`] is the usual entry point; the engine is public for
/// callers that bring their own source.
pub struct Engine<S, W> {
    source: S,
    out: W,
    opts: StreamOptions,
}

impl<S: UnitSource, W: Write> Engine<S, W> {
    pub fn new(source: S, out: W, opts: StreamOptions) -> Self {
        Self { source, out, opts }
    }

    /// Runs the record loop to stream exhaustion.
    ///
    /// # Errors
    ///
    /// Propagates the first fatal read or write error.
    pub fn run(mut self) -> Result<(), EngineError> {
        let mut next = self.read()?;
        loop {
            match self.write_record(next.take())? {
                RecordEnd::Eof => {
                    // Input not NUL-terminated: trailing terminator only in
                    // the one-record ignore-null collapse.
                    if self.opts.null_terminated_output && self.opts.ignore_null_input {
                        self.write(&[0])?;
                    }
                    break;
                }
                RecordEnd::Nul => match self.read()? {
                    None => {
                        if self.opts.null_terminated_output {
                            self.write(&[0])?;
                        }
                        break;
                    }
                    Some(unit) => {
                        if self.opts.ignore_null_input {
                            // The NUL is swallowed; segments join into one
                            // shell word with no separator.
                        } else if self.opts.null_terminated_output {
                            self.write(&[0])?;
                            if self.opts.flush_records {
                                self.flush()?;
                            }
                        } else {
                            self.write(b" ")?;
                        }
                        next = Some(unit);
                    }
                },
            }
        }
        self.flush()
    }

    /// Escapes one record (one segment in ignore-null mode), starting from
    /// an optional already-read first unit.
    fn write_record(&mut self, first: Option<Unit>) -> Result<RecordEnd, EngineError> {
        let mut pending = first;
        let mut wrote_any = false;

        loop {
            let unit = match pending.take() {
                Some(u) => Some(u),
                None => self.read()?,
            };
            let Some(unit) = unit else {
                if !wrote_any {
                    self.write(b"''")?;
                }
                return Ok(RecordEnd::Eof);
            };
            if unit.value() == 0 {
                if !wrote_any {
                    self.write(b"''")?;
                }
                return Ok(RecordEnd::Nul);
            }

            let printable = self.opts.escape.minimal || self.unit_printable(unit);
            // Tilde expansion guard: only meaningful on the first code
            // point of the record.
            let tilde_guard = !wrote_any && unit.value() == u32::from(b'~');
            let needs_quoting = tilde_guard
                || !printable
                || (unit.value() < 0x80 && classify::is_shell_metachar(unit.value() as u8));
            wrote_any = true;

            if !needs_quoting {
                self.write_unit(unit)?;
                continue;
            }

            // A lone quote while unquoted: backslash it, no run needed.
            if unit.value() == u32::from(b'\'') {
                self.write(b"\\'")?;
                continue;
            }

            let end = if self.opts.escape.minimal {
                self.raw_quoted_run(unit)?
            } else {
                self.ansi_quoted_run(unit, printable)?
            };
            if let Some(end) = end {
                return Ok(end);
            }
        }
    }

    /// `'...'`: copies units verbatim until an embedded quote (close,
    /// `\'`, resume unquoted) or end of record.
    fn raw_quoted_run(&mut self, first: Unit) -> Result<Option<RecordEnd>, EngineError> {
        self.write(b"'")?;
        let mut unit = first;
        loop {
            self.write_unit(unit)?;
            match self.read()? {
                None => {
                    self.write(b"'")?;
                    return Ok(Some(RecordEnd::Eof));
                }
                Some(u) if u.value() == 0 => {
                    self.write(b"'")?;
                    return Ok(Some(RecordEnd::Nul));
                }
                Some(u) if u.value() == u32::from(b'\'') => {
                    self.write(b"'\\'")?;
                    return Ok(None);
                }
                Some(u) => unit = u,
            }
        }
    }

    /// `$'...'`: printable units pass through (quote and backslash get
    /// their two-character escapes), everything else goes through the
    /// escape selector with one unit of lookahead.
    fn ansi_quoted_run(
        &mut self,
        first: Unit,
        first_printable: bool,
    ) -> Result<Option<RecordEnd>, EngineError> {
        self.write(b"$'")?;
        let mut unit = first;
        let mut printable = first_printable;
        loop {
            if printable {
                match unit.value() {
                    0x5C => self.write(b"\\\\")?,
                    0x27 => self.write(b"\\'")?,
                    _ => self.write_unit(unit)?,
                }
            } else {
                let next = self.peek()?;
                let esc = select_escape(unit, &self.opts.escape, next);
                esc.write_to(unit, &mut self.out).map_err(EngineError::Write)?;
                if esc.requotes() {
                    self.write(b"'")?;
                    return Ok(None);
                }
            }
            match self.read()? {
                None => {
                    self.write(b"'")?;
                    return Ok(Some(RecordEnd::Eof));
                }
                Some(u) if u.value() == 0 => {
                    self.write(b"'")?;
                    return Ok(Some(RecordEnd::Nul));
                }
                Some(u) => {
                    unit = u;
                    printable = self.unit_printable(u);
                }
            }
        }
    }

    fn unit_printable(&self, unit: Unit) -> bool {
        unit.chr()
            .is_some_and(|ch| classify::is_printable(self.opts.escape.policy, ch))
    }

    /// One-unit lookahead: reads and immediately pushes back.
    fn peek(&mut self) -> Result<Option<Unit>, EngineError> {
        let next = self.read()?;
        if let Some(unit) = next {
            self.source.push_back(unit);
        }
        Ok(next)
    }

    fn read(&mut self) -> Result<Option<Unit>, EngineError> {
        self.source.next_unit().map_err(EngineError::Read)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        self.out.write_all(bytes).map_err(EngineError::Write)
    }

    fn write_unit(&mut self, unit: Unit) -> Result<(), EngineError> {
        self.out.write_all(unit.bytes()).map_err(EngineError::Write)
    }

    fn flush(&mut self) -> Result<(), EngineError> {
        self.out.flush().map_err(EngineError::Write)
    }
}
