//! Escape selection: the textual form of a code point inside `$'...'`
//! quoting, chosen under a greedy-shortest-output policy with one unit of
//! lookahead.
//!
//! The lookahead exists for digit disambiguation: `\1` followed by a
//! literal `2` would be read back by the shell as `\12`, so an octal escape
//! only drops its leading zeros when the next code point is not an octal
//! digit, and similarly for the hex digits after `\u`. The `\U` form never
//! pads; when a hex digit follows it, the quoted run is closed instead and
//! reopened lazily.

use std::io::{self, Write};

use crate::{options::EscapeOptions, source::Unit};

/// Textual form chosen for a non-literal code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// Two-character named escape: `\a` `\b` `\t` `\n` `\v` `\f` `\r`,
    /// plus `\E` in unicode-escape mode.
    Named(char),

    /// Octal escape of a single byte; `pad` forces three digits.
    Octal { byte: u8, pad: bool },

    /// One three-digit octal escape per byte of the original encoding.
    /// Padding is unconditional here: every byte is above 0o177.
    OctalBytes,

    /// `\uXXXX`; `pad` forces four digits.
    UnicodeShort { pad: bool },

    /// `\UXXXXXXXX`, minimal width. `requote` means an ASCII hex digit
    /// follows and the quoted run must close after this escape.
    UnicodeLong { requote: bool },
}

impl Escape {
    /// Whether the quoted run has to be closed after emitting this escape.
    pub(crate) fn requotes(self) -> bool {
        matches!(self, Escape::UnicodeLong { requote: true })
    }

    /// Writes the escape for `unit`, which must be the unit it was
    /// selected for.
    pub(crate) fn write_to<W: Write>(self, unit: Unit, out: &mut W) -> io::Result<()> {
        let value = unit.value();
        match self {
            Escape::Named(letter) => write!(out, "\\{letter}"),
            Escape::Octal { byte, pad: true } => write!(out, "\\{byte:03o}"),
            Escape::Octal { byte, pad: false } => write!(out, "\\{byte:o}"),
            Escape::OctalBytes => {
                for b in unit.bytes() {
                    write!(out, "\\{b:03o}")?;
                }
                Ok(())
            }
            Escape::UnicodeShort { pad: true } => write!(out, "\\u{value:04X}"),
            Escape::UnicodeShort { pad: false } => write!(out, "\\u{value:X}"),
            Escape::UnicodeLong { .. } => write!(out, "\\U{value:X}"),
        }
    }
}

/// The control codes with conventional single-letter escapes. `\E` is
/// recognized by bash, ksh, and zsh but not busybox sh, so it is only used
/// when unicode-escape mode already gave up on busybox compatibility.
fn named_escape(value: u32, unicode_escapes: bool) -> Option<char> {
    match value {
        0x07 => Some('a'),
        0x08 => Some('b'),
        0x09 => Some('t'),
        0x0A => Some('n'),
        0x0B => Some('v'),
        0x0C => Some('f'),
        0x0D => Some('r'),
        0x1B if unicode_escapes => Some('E'),
        _ => None,
    }
}

fn next_is_octal_digit(next: Option<Unit>) -> bool {
    next.is_some_and(|u| matches!(u.value(), 0x30..=0x37))
}

fn next_is_hex_digit(next: Option<Unit>) -> bool {
    next.is_some_and(|u| u.value() < 0x80 && (u.value() as u8).is_ascii_hexdigit())
}

/// Chooses the escape form for `unit`, peeking at the following unit (if
/// any) for digit disambiguation. Pure: the caller owns the push-back.
pub(crate) fn select_escape(unit: Unit, opts: &EscapeOptions, next: Option<Unit>) -> Escape {
    let value = unit.value();
    if let Some(letter) = named_escape(value, opts.unicode_escapes) {
        return Escape::Named(letter);
    }
    if value < 0x80 || unit.chr().is_none() {
        // Single-byte value: plain ASCII control/DEL, or a raw byte that
        // failed to decode.
        let byte = value as u8;
        return Escape::Octal {
            byte,
            pad: byte > 0o77 || next_is_octal_digit(next),
        };
    }
    if !opts.unicode_escapes {
        return Escape::OctalBytes;
    }
    if value <= 0xFFFF {
        Escape::UnicodeShort {
            pad: value > 0xFFF || next_is_hex_digit(next),
        }
    } else {
        Escape::UnicodeLong {
            requote: next_is_hex_digit(next),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::source::Unit;

    fn unit_of(ch: char) -> Unit {
        Unit::scalar(ch)
    }

    fn render(unit: Unit, opts: &EscapeOptions, next: Option<Unit>) -> String {
        let esc = select_escape(unit, opts, next);
        let mut out = Vec::new();
        esc.write_to(unit, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest]
    #[case('\x07', "\\a")]
    #[case('\x08', "\\b")]
    #[case('\t', "\\t")]
    #[case('\n', "\\n")]
    #[case('\x0B', "\\v")]
    #[case('\x0C', "\\f")]
    #[case('\r', "\\r")]
    fn named_escapes(#[case] ch: char, #[case] expected: &str) {
        let opts = EscapeOptions::default();
        assert_eq!(render(unit_of(ch), &opts, None), expected);
    }

    #[test]
    fn escape_char_is_octal_unless_unicode_mode() {
        let mut opts = EscapeOptions::default();
        assert_eq!(render(unit_of('\x1B'), &opts, None), "\\33");
        opts.unicode_escapes = true;
        assert_eq!(render(unit_of('\x1B'), &opts, None), "\\E");
    }

    #[test]
    fn octal_pads_before_octal_digit() {
        let opts = EscapeOptions::default();
        let one = unit_of('\x01');
        assert_eq!(render(one, &opts, Some(unit_of('2'))), "\\001");
        assert_eq!(render(one, &opts, Some(unit_of('8'))), "\\1");
        assert_eq!(render(one, &opts, Some(unit_of('x'))), "\\1");
        assert_eq!(render(one, &opts, None), "\\1");
    }

    #[test]
    fn octal_above_077_is_always_three_digits() {
        let opts = EscapeOptions::default();
        assert_eq!(render(unit_of('\x7F'), &opts, None), "\\177");
        assert_eq!(render(Unit::Byte(0xE0), &opts, None), "\\340");
    }

    #[test]
    fn multibyte_without_unicode_mode_escapes_each_byte() {
        let opts = EscapeOptions::default();
        // U+200B zero-width space: E2 80 8B.
        assert_eq!(render(unit_of('\u{200B}'), &opts, None), "\\342\\200\\213");
    }

    #[test]
    fn unicode_short_pads_before_hex_digit() {
        let opts = EscapeOptions {
            unicode_escapes: true,
            ..EscapeOptions::default()
        };
        let mark = unit_of('\u{61C}');
        assert_eq!(render(mark, &opts, Some(unit_of('f'))), "\\u061C");
        assert_eq!(render(mark, &opts, Some(unit_of('g'))), "\\u61C");
        // Above 0xFFF there is nothing to pad.
        assert_eq!(render(unit_of('\u{200B}'), &opts, None), "\\u200B");
    }

    #[test]
    fn unicode_long_requotes_instead_of_padding() {
        let opts = EscapeOptions {
            unicode_escapes: true,
            ..EscapeOptions::default()
        };
        let tag = unit_of('\u{E0041}');
        let before_hex = select_escape(tag, &opts, Some(unit_of('b')));
        assert_eq!(before_hex, Escape::UnicodeLong { requote: true });
        assert!(before_hex.requotes());
        let before_other = select_escape(tag, &opts, Some(unit_of('z')));
        assert!(!before_other.requotes());
        assert_eq!(render(tag, &opts, None), "\\UE0041");
    }
}
