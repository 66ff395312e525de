/// How aggressively decoded code points are escaped inside `$'...'` quoting.
///
/// The policy only affects code points the active encoding actually decodes;
/// on the byte-oriented path every byte above 0x7F is escaped regardless.
/// A curated set of invisible code points (zero-width spaces, bidi controls,
/// variation selectors, ...) is escaped under every policy.
///
/// # Default
///
/// [`EscapePolicy::Strict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapePolicy {
    /// Escape only code points without a glyph of their own.
    #[default]
    Strict,

    /// Additionally escape every whitespace-equivalent code point except the
    /// ASCII space, including ones that render with a visible width
    /// (no-break space, figure space, Braille blank, ideographic space).
    EscapeNonBlank,

    /// Like [`EscapePolicy::EscapeNonBlank`], but code points that occupy
    /// visible width despite being "spaces" stay unescaped; only the
    /// invisible ones are caught.
    EscapeInvisible,
}

/// Character encoding of the input stream.
///
/// Chosen once per run from the active locale. Non-UTF-8 codesets use the
/// byte-oriented path, where anything above 0x7F is escaped byte-wise; that
/// keeps output byte-exact for any single-byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// One byte per code point (POSIX C locale, ASCII, unknown codesets,
    /// and UTF-8 in minimal mode where the two are equivalent).
    #[default]
    Bytes,

    /// Full UTF-8 decoding with byte-exact recovery on malformed input.
    Utf8,
}

/// Per-run escaping configuration.
///
/// # Default
///
/// Strict policy, byte encoding, ANSI-C quoting enabled, octal byte escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeOptions {
    /// Printability policy for decoded code points.
    pub policy: EscapePolicy,

    /// Input encoding.
    pub encoding: Encoding,

    /// Disable ANSI-C (`$'...'`) quoting entirely and fall back to plain
    /// single-quoting. Output stays parseable by a strictly POSIX shell
    /// such as dash; non-printable bytes pass through unescaped.
    pub minimal: bool,

    /// Prefer `\uXXXX` / `\UXXXXXXXX` escapes for non-printable code points
    /// above 0x7F, and `\E` for the escape character, over octal escapes of
    /// the UTF-8 encoding. Shorter output, but busybox sh does not read it.
    pub unicode_escapes: bool,
}

/// Stream-level configuration: record splitting, delimiters, flushing.
///
/// # Default
///
/// Records split on NUL, space-separated output, no per-record flush.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOptions {
    /// Escaping configuration applied to every record.
    pub escape: EscapeOptions,

    /// Treat NUL bytes as ordinary input rather than record separators,
    /// collapsing the whole stream into a single output word. The NUL byte
    /// itself is dropped from the output.
    pub ignore_null_input: bool,

    /// Separate output records with NUL bytes instead of spaces. The final
    /// record also gets a terminator when the input itself ended with a
    /// record separator, or when `ignore_null_input` is set.
    pub null_terminated_output: bool,

    /// Flush the output sink after each record separator. Only useful when
    /// a consumer runs the escaper as a coprocess and needs records to
    /// arrive promptly.
    pub flush_records: bool,
}
