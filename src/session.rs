//! Session symbol sequence and its loader.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};

/// Sequence used when the session resource is missing
pub const FALLBACK_SESSION: &str =
    "T00000F26000C04220S02040E06660L06660L16240L26620L32020D02660D16660D26660D34060D";

/// Length of the all-zero sequence used when the session resource is empty
pub const EMPTY_SESSION_LEN: usize = 64;

/// Where a loaded sequence came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOrigin {
    File(PathBuf),
    /// Resource missing or unreadable
    Fallback,
    /// Resource present but blank
    EmptyDefault,
}

/// Non-empty cyclic sequence of session symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicSequence {
    symbols: Vec<char>,
}

impl SymbolicSequence {
    /// Build from text, trimming surrounding whitespace
    pub fn from_text(text: &str) -> EngineResult<Self> {
        let symbols: Vec<char> = text.trim().chars().collect();
        if symbols.is_empty() {
            return Err(EngineError::Session("session text is empty".to_string()));
        }
        Ok(Self { symbols })
    }

    pub fn fallback() -> Self {
        Self {
            symbols: FALLBACK_SESSION.chars().collect(),
        }
    }

    pub fn empty_default() -> Self {
        Self {
            symbols: vec!['0'; EMPTY_SESSION_LEN],
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol active at `tick`, indexing cyclically
    pub fn symbol_at(&self, tick: u64) -> char {
        let idx = (tick % self.symbols.len() as u64) as usize;
        self.symbols[idx]
    }

    /// Load a session resource, substituting defaults instead of failing
    pub fn load(path: &Path) -> (Self, SessionOrigin) {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_text(&text) {
                Ok(sequence) => {
                    info!(
                        "Loaded session {} (len={})",
                        path.display(),
                        sequence.len()
                    );
                    (sequence, SessionOrigin::File(path.to_path_buf()))
                }
                Err(_) => {
                    warn!(
                        "Session file {} is empty; using {} zero symbols",
                        path.display(),
                        EMPTY_SESSION_LEN
                    );
                    (Self::empty_default(), SessionOrigin::EmptyDefault)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Session file {} not found; using fallback sequence",
                    path.display()
                );
                (Self::fallback(), SessionOrigin::Fallback)
            }
            Err(e) => {
                warn!(
                    "Session file {} unreadable ({}); using fallback sequence",
                    path.display(),
                    e
                );
                (Self::fallback(), SessionOrigin::Fallback)
            }
        }
    }
}

impl fmt::Display for SymbolicSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_indexing() {
        let seq = SymbolicSequence::from_text("T0").unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.symbol_at(0), 'T');
        assert_eq!(seq.symbol_at(1), '0');
        assert_eq!(seq.symbol_at(2), 'T');
        assert_eq!(seq.symbol_at(35_553), '0');
        assert_eq!(seq.symbol_at(u64::MAX), '0');
    }

    #[test]
    fn test_from_text_trims_and_rejects_blank() {
        let seq = SymbolicSequence::from_text("  ABC\n").unwrap();
        assert_eq!(seq.to_string(), "ABC");
        assert!(SymbolicSequence::from_text(" \n\t").is_err());
    }

    #[test]
    fn test_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (seq, origin) = SymbolicSequence::load(&dir.path().join("missing.txt"));

        assert_eq!(origin, SessionOrigin::Fallback);
        assert_eq!(seq.to_string(), FALLBACK_SESSION);
        assert_eq!(seq.symbol_at(0), 'T');
    }

    #[test]
    fn test_empty_file_uses_zero_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        std::fs::write(&path, "\n").unwrap();

        let (seq, origin) = SymbolicSequence::load(&path);
        assert_eq!(origin, SessionOrigin::EmptyDefault);
        assert_eq!(seq.len(), EMPTY_SESSION_LEN);
        assert!(seq.to_string().chars().all(|c| c == '0'));
    }

    #[test]
    fn test_file_contents_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        std::fs::write(&path, "T0S:\n").unwrap();

        let (seq, origin) = SymbolicSequence::load(&path);
        assert_eq!(origin, SessionOrigin::File(path.clone()));
        assert_eq!(seq.to_string(), "T0S:");
    }
}
