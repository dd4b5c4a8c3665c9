//! Association handles that may or may not carry their record.
//!
//! Records arriving from the persistence layer often reference related
//! records that were never fetched. Those references are modeled as
//! `Lazy::Unloaded` and any attempt to read through them fails instead of
//! reaching back into storage.

use crate::error::Error;
use crate::Id;

/// Static name of an entity kind, used in diagnostics and wire markers.
pub trait EntityName {
    const NAME: &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lazy<T> {
    Loaded(Box<T>),
    Unloaded { id: Option<Id> },
}

impl<T: EntityName> Lazy<T> {
    pub fn loaded(value: T) -> Self {
        Lazy::Loaded(Box::new(value))
    }

    pub fn unloaded(id: Id) -> Self {
        Lazy::Unloaded { id: Some(id) }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Lazy::Loaded(_))
    }

    /// Borrow the underlying record, failing if it was never loaded.
    pub fn get(&self) -> Result<&T, Error> {
        match self {
            Lazy::Loaded(value) => Ok(value),
            Lazy::Unloaded { .. } => Err(Error::unloaded(T::NAME)),
        }
    }
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Lazy::Unloaded { id: None }
    }
}
