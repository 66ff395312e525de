//! Code-point classification: printability under the active policy, and
//! shell metacharacter detection for ASCII bytes.

use unicode_width::UnicodeWidthChar;

use crate::options::EscapePolicy;

/// ASCII bytes a POSIX shell interprets specially outside quotes: quoting
/// characters, expansion introducers, glob characters, operators, brace and
/// bracket characters, and whitespace. `=` and `%` are deliberately absent
/// (not misinterpretable as an argument), as is `~`, which only matters at
/// the start of a word and is handled positionally by the engine. `^` and
/// `,` are included against bracket and brace expansion. Values at 0x80 and
/// above are never metacharacters.
pub(crate) fn is_shell_metachar(b: u8) -> bool {
    matches!(
        b,
        b'\t' | b'\n'
            | b' '
            | b'!'
            | b'"'
            | b'#'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b','
            | b';'
            | b'<'
            | b'>'
            | b'?'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'`'
            | b'{'
            | b'|'
            | b'}'
    )
}

/// Code points that render as nothing by themselves: zero-width spaces and
/// joiners, bidi controls, variation selectors, tag characters, the BOM,
/// and a few singletons observed to misrender. These are escaped under
/// every policy; the platform printability test does not reliably flag
/// them. A curated subset of <https://invisible-characters.com/> — data,
/// not gospel, and deliberately kept editable as a table of ranges.
const INVISIBLE: &[(u32, u32)] = &[
    (0x00AD, 0x00AD),   // soft hyphen
    (0x034F, 0x034F),   // combining grapheme joiner
    (0x061C, 0x061C),   // arabic letter mark
    (0x115F, 0x1160),   // hangul fillers
    (0x17B4, 0x17B5),   // khmer inherent vowels
    (0x180B, 0x180E),   // mongolian selectors, vowel separator
    (0x200B, 0x200F),   // zero-width spaces/joiners, bidi marks
    (0x202A, 0x202E),   // bidi embedding controls
    (0x2060, 0x206F),   // word joiner, invisible operators, deprecated bidi
    (0xFE00, 0xFE0F),   // variation selectors
    (0xFEFF, 0xFEFF),   // byte-order mark
    (0xFFA0, 0xFFA0),   // halfwidth hangul filler
    (0xFFFC, 0xFFFC),   // object replacement character
    (0x1D159, 0x1D159), // musical null notehead
    (0x1D173, 0x1D17A), // musical formatting controls
    (0xE0001, 0xE0001), // language tag
    (0xE0020, 0xE007F), // tag characters
    (0xE0100, 0xE01EF), // variation selectors supplement
];

fn is_invisible(ch: char) -> bool {
    let v = ch as u32;
    INVISIBLE.iter().any(|&(lo, hi)| (lo..=hi).contains(&v))
}

/// Whitespace-equivalent code points: the White_Space property plus the
/// blank-rendering characters it misses.
fn is_blankish(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{2800}' | '\u{3164}')
}

/// "Space" code points that nevertheless occupy visible width in a
/// terminal: no-break space, the U+2000 quad family, narrow no-break
/// space, medium mathematical space, Braille blank, ideographic space,
/// hangul filler.
fn is_visible_blank(ch: char) -> bool {
    matches!(
        ch,
        '\u{00A0}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{2800}'
            | '\u{3000}'
            | '\u{3164}'
    )
}

/// Whether a decoded code point may appear literally in the output under
/// `policy`. Raw undecoded bytes never reach this function; the engine
/// treats them as unprintable outright.
#[must_use]
pub fn is_printable(policy: EscapePolicy, ch: char) -> bool {
    if is_invisible(ch) {
        return false;
    }
    // Stand-in for locale printability: control characters have no width.
    if ch.width().is_none() {
        return false;
    }
    match policy {
        EscapePolicy::Strict => true,
        EscapePolicy::EscapeNonBlank => ch == ' ' || !is_blankish(ch),
        EscapePolicy::EscapeInvisible => {
            ch == ' ' || !is_blankish(ch) || is_visible_blank(ch)
        }
    }
}
