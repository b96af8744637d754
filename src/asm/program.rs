//! LS-8 program image format.
//!
//! A program image is a plain text file:
//! - One byte per line, written as a base-2 literal (e.g. `10000010`)
//! - Everything from `#` to the end of a line is a comment
//! - Blank and comment-only lines are ignored
//!
//! Bytes are placed at consecutive memory addresses starting at 0.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Parse a program image from text.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let code = line.split('#').next().unwrap_or("");
        let token = code.trim();

        if token.is_empty() {
            continue;
        }

        let byte = u8::from_str_radix(token, 2).map_err(|_| LoadError::InvalidToken {
            line: line_num + 1,
            token: token.to_string(),
        })?;

        program.push(byte);
    }

    Ok(program)
}

/// Load a program image from disk.
pub fn load_program_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| LoadError::Io(e.to_string()))?;
    let reader = BufReader::new(file);

    let mut source = String::new();
    for line_result in reader.lines() {
        let line = line_result.map_err(|e| LoadError::Io(e.to_string()))?;
        source.push_str(&line);
        source.push('\n');
    }

    parse_program(&source)
}

/// Save a program image to disk.
pub fn save_program_file<P: AsRef<Path>>(path: P, program: &[u8]) -> Result<(), LoadError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| LoadError::Io(e.to_string()))?;

    writeln!(file, "# LS-8 program image").map_err(|e| LoadError::Io(e.to_string()))?;
    writeln!(file, "# {} bytes", program.len()).map_err(|e| LoadError::Io(e.to_string()))?;
    writeln!(file).map_err(|e| LoadError::Io(e.to_string()))?;

    for (addr, byte) in program.iter().enumerate() {
        writeln!(file, "{:08b} # {:03}", byte, addr).map_err(|e| LoadError::Io(e.to_string()))?;
    }

    Ok(())
}

/// Errors that can occur while loading a program image.
///
/// These surface to the invoker before the CPU ever runs; the engine
/// never observes a partially loaded program.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid binary literal on line {line}: '{token}'")]
    InvalidToken { line: usize, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_program() {
        let source = "10000010\n00000000\n00101010\n00000001\n";
        let program = parse_program(source).unwrap();
        assert_eq!(program, vec![0b1000_0010, 0, 42, 1]);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let source = r#"
# Load 42 into R0 and halt
10000010 # LDI R0, 42
00000000
00101010

00000001 # HLT
"#;
        let program = parse_program(source).unwrap();
        assert_eq!(program, vec![0b1000_0010, 0, 42, 1]);
    }

    #[test]
    fn test_parse_rejects_non_binary_token() {
        let err = parse_program("10000010\nhello\n").unwrap_err();
        match err {
            LoadError::InvalidToken { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "hello");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_overwide_literal() {
        // 9 bits does not fit a byte.
        assert!(parse_program("100000000\n").is_err());
    }

    #[test]
    fn test_parse_empty_source() {
        assert_eq!(parse_program("# nothing here\n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_missing_file() {
        let err = load_program_file("/no/such/file.ls8").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
