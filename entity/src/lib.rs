use uuid::Uuid;

pub mod attendees;
pub mod error;
pub mod events;
pub mod lazy;
pub mod tasks;

pub use attendees::{Attendee, AttendeePatch};
pub use events::{Event, EventPatch};
pub use lazy::{EntityName, Lazy};
pub use tasks::{Task, TaskPatch};

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
