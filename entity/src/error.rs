//! Error types for the `entity` crate.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for entity access.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: EntityErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    /// The record behind an association proxy was never loaded, so none of
    /// its fields can be read.
    Unloaded { entity_type: &'static str },
}

impl Error {
    pub fn unloaded(entity_type: &'static str) -> Self {
        Error {
            source: None,
            error_kind: EntityErrorKind::Unloaded { entity_type },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            EntityErrorKind::Unloaded { entity_type } => {
                write!(f, "Entity error: {entity_type} proxy is not loaded")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
