//! Program image format.
//!
//! A program image is a single line of comma-separated signed decimal integers,
//! loaded verbatim into memory starting at address 0.

use crate::virtual_machine::Word;
use crate::virtual_machine::errors::VMError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// An initial memory image.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    /// Wraps an already parsed image.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Reads and parses a program image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VMError> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| VMError::Io(format!("{}: {e}", path.as_ref().display())))?;
        text.parse()
    }

    /// Returns the image words.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of words in the image.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<Vec<Word>> for Program {
    fn from(words: Vec<Word>) -> Self {
        Self::new(words)
    }
}

impl From<&[Word]> for Program {
    fn from(words: &[Word]) -> Self {
        Self::new(words.to_vec())
    }
}

impl FromStr for Program {
    type Err = VMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VMError::EmptyProgram);
        }

        let words = s
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                let token = token.trim();
                token.parse::<Word>().map_err(|_| VMError::ProgramParse {
                    position,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { words })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_image() {
        let p: Program = "1,0,0,0,99".parse().unwrap();
        assert_eq!(p.words(), &[1, 0, 0, 0, 99]);
    }

    #[test]
    fn parse_tolerates_whitespace_and_trailing_newline() {
        let p: Program = " 1002, 4,3 ,4,-33\n".parse().unwrap();
        assert_eq!(p.words(), &[1002, 4, 3, 4, -33]);
    }

    #[test]
    fn parse_large_values() {
        let p: Program = "104,1125899906842624,99".parse().unwrap();
        assert_eq!(p.words()[1], 1125899906842624);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(
            "1,2,x,4".parse::<Program>(),
            Err(VMError::ProgramParse {
                position: 2,
                token: "x".to_string()
            })
        );
        assert!(matches!(
            "1,,2".parse::<Program>(),
            Err(VMError::ProgramParse { position: 1, .. })
        ));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!("".parse::<Program>(), Err(VMError::EmptyProgram));
        assert_eq!("  \n".parse::<Program>(), Err(VMError::EmptyProgram));
    }

    #[test]
    fn display_matches_image_format() {
        let source = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
        let p: Program = source.parse().unwrap();
        assert_eq!(p.to_string(), source);
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Program::from_file("/nonexistent/intcode/program.txt").unwrap_err();
        assert!(matches!(err, VMError::Io(_)));
    }
}
