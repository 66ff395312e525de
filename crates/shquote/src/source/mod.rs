//! Code-point sources: pull one logical unit at a time with one-unit
//! push-back and raw-byte retention.
//!
//! Overview
//! - A [`Unit`] is either a decoded Unicode scalar together with the bytes
//!   it was decoded from, or a single raw byte that did not form a valid
//!   sequence. Raw bytes are first-class: they flow through the engine and
//!   are escaped byte-wise, so malformed input never loses data.
//! - [`ByteSource`] treats every input byte as its own unit (C/ASCII
//!   locales, and UTF-8 in minimal mode where the distinction is moot).
//! - [`Utf8Source`] decodes multi-byte sequences. On a failed decode it
//!   returns the lead byte as a raw unit and keeps the bytes already read
//!   in a small replay ring, where the next call re-examines them; a
//!   retained byte may legitimately begin a new valid sequence.
//!
//! Invariants
//! - `push_back` accepts at most one unit between reads; the slot is
//!   drained before the replay ring, which is drained before the reader.
//! - The replay ring never exceeds three bytes (the continuation bytes of
//!   one four-byte sequence), so total lookahead is bounded by the width
//!   of a single code point plus the push-back slot.
//! - A decoded unit re-emits its original bytes verbatim; nothing is ever
//!   re-encoded.

use std::{collections::VecDeque, io, slice};

/// The original encoding of a decoded scalar, one to four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBytes {
    buf: [u8; 4],
    len: u8,
}

impl RawBytes {
    fn from_slice(bytes: &[u8]) -> Self {
        debug_assert!((1..=4).contains(&bytes.len()));
        let mut buf = [0u8; 4];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            len: bytes.len() as u8,
        }
    }

    fn of(ch: char) -> Self {
        let mut buf = [0u8; 4];
        let len = ch.encode_utf8(&mut buf).len() as u8;
        Self { buf, len }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

/// One logical unit pulled from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// A decoded Unicode scalar and the bytes it came from.
    Scalar(char, RawBytes),

    /// A byte that did not decode (invalid lead or the head of a rejected
    /// sequence); re-emitted as itself.
    Byte(u8),
}

impl Unit {
    pub(crate) fn scalar(ch: char) -> Self {
        Unit::Scalar(ch, RawBytes::of(ch))
    }

    /// The code point value: the scalar value for decoded units, the byte
    /// value for raw bytes.
    #[must_use]
    pub fn value(&self) -> u32 {
        match self {
            Unit::Scalar(ch, _) => *ch as u32,
            Unit::Byte(b) => u32::from(*b),
        }
    }

    /// The decoded scalar, or `None` for a raw byte.
    #[must_use]
    pub fn chr(&self) -> Option<char> {
        match self {
            Unit::Scalar(ch, _) => Some(*ch),
            Unit::Byte(_) => None,
        }
    }

    /// The bytes to emit for this unit, exactly as they were read.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Unit::Scalar(_, raw) => raw.as_slice(),
            Unit::Byte(b) => slice::from_ref(b),
        }
    }
}

/// A pull source of [`Unit`]s with one-unit push-back.
pub trait UnitSource {
    /// Pulls the next unit, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying reader. Malformed byte
    /// sequences are not errors; they surface as [`Unit::Byte`].
    fn next_unit(&mut self) -> io::Result<Option<Unit>>;

    /// Returns a just-read unit to the front of the stream. Must be called
    /// at most once between reads.
    fn push_back(&mut self, unit: Unit);
}

fn read_one<R: io::Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Byte-oriented source: every byte is one unit.
///
/// Bytes below 0x80 come out as ASCII scalars, everything else as raw
/// bytes, which the classifier never treats as printable.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    pushed: Option<Unit>,
}

impl<R: io::Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pushed: None,
        }
    }
}

impl<R: io::Read> UnitSource for ByteSource<R> {
    fn next_unit(&mut self) -> io::Result<Option<Unit>> {
        if let Some(unit) = self.pushed.take() {
            return Ok(Some(unit));
        }
        Ok(read_one(&mut self.inner)?.map(|b| {
            if b < 0x80 {
                Unit::scalar(char::from(b))
            } else {
                Unit::Byte(b)
            }
        }))
    }

    fn push_back(&mut self, unit: Unit) {
        debug_assert!(self.pushed.is_none(), "push_back without intervening read");
        self.pushed = Some(unit);
    }
}

/// Expected sequence length for a UTF-8 lead byte, `None` for bytes that
/// cannot begin a sequence (stray continuations, 0xF8 and above).
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Assembles and validates a complete sequence: rejects overlong forms,
/// UTF-16 surrogate values, and anything above 0x10FFFF.
fn decode_scalar(seq: &[u8]) -> Option<char> {
    let (value, min) = match *seq {
        [b0, b1] => ((u32::from(b0 & 0x1F) << 6) | u32::from(b1 & 0x3F), 0x80),
        [b0, b1, b2] => (
            (u32::from(b0 & 0x0F) << 12) | (u32::from(b1 & 0x3F) << 6) | u32::from(b2 & 0x3F),
            0x800,
        ),
        [b0, b1, b2, b3] => (
            (u32::from(b0 & 0x07) << 18)
                | (u32::from(b1 & 0x3F) << 12)
                | (u32::from(b2 & 0x3F) << 6)
                | u32::from(b3 & 0x3F),
            0x1_0000,
        ),
        _ => return None,
    };
    if value < min {
        return None;
    }
    // from_u32 rejects surrogates and values above 0x10FFFF.
    char::from_u32(value)
}

/// Recovering UTF-8 source.
///
/// Decoding failure is local: the lead byte comes back as [`Unit::Byte`]
/// and the bytes read after it wait in the replay ring for the next call.
/// The stream stays byte-exact through arbitrary garbage.
#[derive(Debug)]
pub struct Utf8Source<R> {
    inner: R,
    replay: VecDeque<u8>,
    pushed: Option<Unit>,
}

impl<R: io::Read> Utf8Source<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            replay: VecDeque::with_capacity(4),
            pushed: None,
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.replay.pop_front() {
            return Ok(Some(b));
        }
        read_one(&mut self.inner)
    }

    /// Prepends bytes to the replay ring, preserving their stream order.
    fn unread(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.replay.push_front(b);
        }
    }
}

impl<R: io::Read> UnitSource for Utf8Source<R> {
    fn next_unit(&mut self) -> io::Result<Option<Unit>> {
        if let Some(unit) = self.pushed.take() {
            return Ok(Some(unit));
        }
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        if lead < 0x80 {
            return Ok(Some(Unit::scalar(char::from(lead))));
        }
        let Some(len) = sequence_len(lead) else {
            return Ok(Some(Unit::Byte(lead)));
        };

        let mut seq = [lead, 0, 0, 0];
        let mut have = 1;
        while have < len {
            match self.next_byte()? {
                Some(b) if b & 0xC0 == 0x80 => {
                    seq[have] = b;
                    have += 1;
                }
                Some(b) => {
                    // Not a continuation byte: it may begin a sequence of
                    // its own, so it goes back first.
                    self.unread(slice::from_ref(&b));
                    break;
                }
                None => break,
            }
        }
        if have < len {
            self.unread(&seq[1..have]);
            return Ok(Some(Unit::Byte(lead)));
        }

        match decode_scalar(&seq[..len]) {
            Some(ch) => Ok(Some(Unit::Scalar(ch, RawBytes::from_slice(&seq[..len])))),
            None => {
                self.unread(&seq[1..len]);
                Ok(Some(Unit::Byte(lead)))
            }
        }
    }

    fn push_back(&mut self, unit: Unit) {
        debug_assert!(self.pushed.is_none(), "push_back without intervening read");
        self.pushed = Some(unit);
    }
}

#[cfg(test)]
mod tests;
