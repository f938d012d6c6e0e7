use std::fs::OpenOptions;

use crate::{Result, StreamError};

/// Mode assumed when a handle does not report one.
pub const DEFAULT_MODE: &str = "r";

const READ_TOKENS: &[char] = &['r', '+'];
const WRITE_TOKENS: &[char] = &['w', 'a', 'x', 'c', '+'];

pub fn is_readable(mode: &str) -> bool {
    mode.contains(READ_TOKENS)
}

pub fn is_writable(mode: &str) -> bool {
    mode.contains(WRITE_TOKENS)
}

/// Translate an `fopen`-style mode (`"r"`, `"w+"`, `"ab"`, `"x+t"`, ...)
/// into [`OpenOptions`].
///
/// The first character selects the base mode, an optional `+` adds the
/// missing direction and `b`/`t` flags are accepted and ignored.
pub fn open_options(mode: &str) -> Result<OpenOptions> {
    let mut chars = mode.chars();
    let base = chars
        .next()
        .ok_or_else(|| StreamError::argument("empty open mode"))?;

    let mut plus = false;
    for flag in chars {
        match flag {
            '+' if !plus => plus = true,
            'b' | 't' => {}
            _ => {
                return Err(StreamError::argument(format!(
                    "unsupported open mode `{}`",
                    mode
                )))
            }
        }
    }

    let mut options = OpenOptions::new();
    match base {
        'r' => {
            options.read(true).write(plus);
        }
        'w' => {
            options
                .write(true)
                .read(plus)
                .create(true)
                .truncate(true);
        }
        'a' => {
            options.append(true).read(plus).create(true);
        }
        'x' => {
            options.write(true).read(plus).create_new(true);
        }
        'c' => {
            options.write(true).read(plus).create(true);
        }
        _ => {
            return Err(StreamError::argument(format!(
                "unsupported open mode `{}`",
                mode
            )))
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("r", true, false)]
    #[case("rb", true, false)]
    #[case("rt", true, false)]
    #[case("r+", true, true)]
    #[case("r+b", true, true)]
    #[case("w", false, true)]
    #[case("wb", false, true)]
    #[case("w+", true, true)]
    #[case("a", false, true)]
    #[case("a+", true, true)]
    #[case("x", false, true)]
    #[case("x+b", true, true)]
    #[case("c", false, true)]
    #[case("c+", true, true)]
    #[case("rw", true, true)]
    fn capabilities_follow_mode_tokens(
        #[case] mode: &str,
        #[case] readable: bool,
        #[case] writable: bool,
    ) {
        assert_eq!(is_readable(mode), readable, "readable for {mode}");
        assert_eq!(is_writable(mode), writable, "writable for {mode}");
    }

    #[rstest]
    #[case("")]
    #[case("q")]
    #[case("r++")]
    #[case("rw")]
    #[case("w+z")]
    fn unsupported_modes_are_argument_errors(#[case] mode: &str) {
        let err = open_options(mode).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn known_modes_parse() {
        for mode in ["r", "r+", "w", "w+b", "a", "a+", "x", "x+", "c", "ct"] {
            assert!(open_options(mode).is_ok(), "mode {mode}");
        }
    }
}
