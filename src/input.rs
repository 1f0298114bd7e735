//! Input sources
//!
//! Documents and generation outputs come from a file or from stdin (`-`).

use crate::error::LoadError;
use crate::schema::GenerationOutput;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where an input is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Parse a command-line input specifier: `-` for stdin, anything else a path.
    pub fn parse(spec: &str) -> Self {
        if spec == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(spec))
        }
    }

    /// Display name, also used as the default service label
    pub fn name(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map_or_else(|| path.display().to_string(), ToString::to_string),
        }
    }

    pub fn read_to_string(&self) -> Result<String, LoadError> {
        let result = match self {
            Self::Stdin => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf).map(|_| buf)
            }
            Self::File(path) => fs::read_to_string(path),
        };
        result.map_err(|source| LoadError::Io {
            source_name: self.describe(),
            source,
        })
    }

    /// Read and decode a generation output JSON document.
    pub fn read_generation(&self) -> Result<GenerationOutput, LoadError> {
        let content = self.read_to_string()?;
        serde_json::from_str(&content).map_err(|source| LoadError::Json {
            source_name: self.describe(),
            source,
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}
