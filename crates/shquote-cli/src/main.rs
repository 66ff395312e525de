//! `shquote`: escape arguments or NUL-delimited stdin records so a POSIX
//! shell reads them back verbatim.
//!
//! The binary is thin glue: flag parsing, locale-based encoding detection,
//! input selection, and sysexits-style exit codes. All quoting behavior
//! lives in the `shquote` library crate.

use std::env;
use std::ffi::OsString;
use std::io::{self, Cursor, Write};
use std::os::unix::ffi::OsStrExt;
use std::process::ExitCode;

use clap::Parser;
use shquote::{Encoding, EscapeOptions, EscapePolicy, StreamOptions, escape_stream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EX_USAGE: u8 = 64;
const EX_IOERR: u8 = 74;

#[derive(Debug, Parser)]
#[command(
    name = "shquote",
    version,
    about = "Escape strings so a POSIX shell reads them back verbatim",
    after_help = "With no STRING arguments, records are read from standard \
                  input, delimited by NUL bytes."
)]
struct Cli {
    /// Escape every code point that is not a blank, including visible
    /// blanks such as no-break space.
    #[arg(short = 'e', long = "escape-more")]
    escape_more: bool,

    /// Flush output after each record; implies -z.
    #[arg(short = 'f', long = "flush-arguments")]
    flush_arguments: bool,

    /// Escape invisible code points while leaving visible blanks literal.
    /// Ignored when -e is also given.
    #[arg(short = 'i', long = "escape-invisible")]
    escape_invisible: bool,

    /// Minimal machine-oriented quoting: single quotes only, bytes pass
    /// through unescaped.
    #[arg(short = 'm', long = "minimal")]
    minimal: bool,

    /// Drop NUL bytes from stdin and join the segments into one word.
    /// Only meaningful when reading standard input.
    #[arg(short = 'n', long = "ignore-null-input")]
    ignore_null_input: bool,

    /// Prefer \uXXXX and \UXXXXXXXX escapes over per-byte octal.
    #[arg(short = 'u', long = "unicode-escapes")]
    unicode_escapes: bool,

    /// Terminate each output record with NUL instead of separating records
    /// with spaces.
    #[arg(short = 'z', long = "null-terminated-output")]
    null_terminated_output: bool,

    /// Strings to escape.
    #[arg(value_name = "STRING")]
    strings: Vec<OsString>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version print to stdout and are not errors.
            let code = if err.use_stderr() { EX_USAGE } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shquote: {err}");
            ExitCode::from(EX_IOERR)
        }
    }
}

fn run(cli: &Cli) -> Result<(), shquote::EngineError> {
    let encoding = if cli.minimal {
        // Minimal output never escapes, so decoding buys nothing.
        Encoding::Bytes
    } else {
        detect_encoding(locale_from_env().as_deref())
    };
    let opts = options_from(cli, encoding);
    debug!(
        ?encoding,
        policy = ?opts.escape.policy,
        null_terminated = opts.null_terminated_output,
        from_stdin = cli.strings.is_empty(),
        "configured"
    );

    let stdout = io::stdout().lock();
    let mut out = io::BufWriter::new(stdout);
    if cli.strings.is_empty() {
        escape_stream(io::stdin().lock(), &mut out, opts)?;
    } else {
        escape_stream(Cursor::new(nul_joined(&cli.strings)), &mut out, opts)?;
    }
    out.flush().map_err(shquote::EngineError::Write)
}

fn options_from(cli: &Cli, encoding: Encoding) -> StreamOptions {
    // -e wins over -i regardless of order on the command line.
    let policy = if cli.escape_more {
        EscapePolicy::EscapeNonBlank
    } else if cli.escape_invisible {
        EscapePolicy::EscapeInvisible
    } else {
        EscapePolicy::Strict
    };
    StreamOptions {
        escape: EscapeOptions {
            policy,
            encoding,
            minimal: cli.minimal,
            unicode_escapes: cli.unicode_escapes,
        },
        // NUL never occurs inside an argument, so ignore-null only applies
        // to the stdin path.
        ignore_null_input: cli.ignore_null_input && cli.strings.is_empty(),
        null_terminated_output: cli.null_terminated_output || cli.flush_arguments,
        flush_records: cli.flush_arguments,
    }
}

/// Joins arguments into one NUL-terminated-records stream, so the argument
/// and stdin paths share the engine's delimiter handling.
fn nul_joined(strings: &[OsString]) -> Vec<u8> {
    let mut joined = Vec::with_capacity(strings.iter().map(|s| s.len() + 1).sum());
    for s in strings {
        joined.extend_from_slice(s.as_bytes());
        joined.push(0);
    }
    joined
}

/// The effective locale string, from the usual POSIX precedence chain.
fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Keys on the locale's codeset suffix: `en_US.UTF-8` and `C.utf8` select
/// the decoding path, everything else (including no locale at all) is
/// treated byte-wise.
fn detect_encoding(locale: Option<&str>) -> Encoding {
    let Some(locale) = locale else {
        return Encoding::Bytes;
    };
    let codeset = match locale.split_once('.') {
        Some((_, rest)) => rest.split('@').next().unwrap_or(rest),
        None => return Encoding::Bytes,
    };
    if codeset.eq_ignore_ascii_case("utf-8") || codeset.eq_ignore_ascii_case("utf8") {
        Encoding::Utf8
    } else {
        Encoding::Bytes
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shquote").chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case(None, Encoding::Bytes)]
    #[case(Some("C"), Encoding::Bytes)]
    #[case(Some("en_US.UTF-8"), Encoding::Utf8)]
    #[case(Some("C.utf8"), Encoding::Utf8)]
    #[case(Some("de_DE.UTF-8@euro"), Encoding::Utf8)]
    #[case(Some("ja_JP.eucJP"), Encoding::Bytes)]
    #[case(Some("POSIX"), Encoding::Bytes)]
    fn encoding_detection(#[case] locale: Option<&str>, #[case] expected: Encoding) {
        assert_eq!(detect_encoding(locale), expected);
    }

    #[test]
    fn escape_more_wins_over_escape_invisible() {
        for args in [&["-e", "-i"][..], &["-i", "-e"][..]] {
            let opts = options_from(&parse(args), Encoding::Bytes);
            assert_eq!(opts.escape.policy, EscapePolicy::EscapeNonBlank);
        }
        let opts = options_from(&parse(&["-i"]), Encoding::Bytes);
        assert_eq!(opts.escape.policy, EscapePolicy::EscapeInvisible);
    }

    #[test]
    fn flush_implies_null_terminated_output() {
        let opts = options_from(&parse(&["-f"]), Encoding::Bytes);
        assert!(opts.null_terminated_output);
        assert!(opts.flush_records);
    }

    #[test]
    fn arguments_disable_ignore_null() {
        let opts = options_from(&parse(&["-n", "a", "b"]), Encoding::Bytes);
        assert!(!opts.ignore_null_input);
        let opts = options_from(&parse(&["-n"]), Encoding::Bytes);
        assert!(opts.ignore_null_input);
    }

    #[test]
    fn arguments_join_as_nul_terminated_records() {
        let strings = [OsString::from("a"), OsString::from("bc")];
        assert_eq!(nul_joined(&strings), b"a\0bc\0");
    }

    #[test]
    fn unknown_flags_are_usage_errors() {
        let err = Cli::try_parse_from(["shquote", "--frobnicate"]).unwrap_err();
        assert!(err.use_stderr());
        let help = Cli::try_parse_from(["shquote", "--help"]).unwrap_err();
        assert!(!help.use_stderr());
    }
}
