//! Run-mode prompt

use std::io::{self, BufRead, Write};

/// Question asked when no indentation flag is given
pub const INDENT_PROMPT: &str = "Use indentation in the exported sheets? y/n";

/// Interpret one answer
#[must_use]
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim() {
        "y" | "Y" | "yes" | "Yes" => Some(true),
        "n" | "N" | "no" | "No" => Some(false),
        _ => None,
    }
}

/// Ask until a recognised answer is given
///
/// # Errors
/// Returns `UnexpectedEof` if input ends first, or the underlying I/O error.
pub fn ask_indent<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
    let mut line = String::new();
    loop {
        writeln!(output, "{INDENT_PROMPT}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer given"));
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_answers() {
        for yes in ["y", "Y", "yes", "Yes", " yes\n"] {
            assert_eq!(parse_answer(yes), Some(true), "{yes:?}");
        }
        for no in ["n", "N", "no", "No"] {
            assert_eq!(parse_answer(no), Some(false), "{no:?}");
        }
        for other in ["", "YES", "nope", "1"] {
            assert_eq!(parse_answer(other), None, "{other:?}");
        }
    }

    #[test]
    fn reasks_until_valid() {
        let mut out = Vec::new();
        let answer = ask_indent("maybe\n\nNo\n".as_bytes(), &mut out).unwrap();

        assert!(!answer);
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches(INDENT_PROMPT).count(), 3);
    }

    #[test]
    fn eof_is_error() {
        let err = ask_indent("what\n".as_bytes(), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
