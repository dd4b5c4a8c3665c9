use crate::lazy::EntityName;
use crate::Id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Id,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EntityName for Event {
    const NAME: &'static str = "Event";
}

/// Partial update for an `Event`. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventPatch {
    pub fn apply_to(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = Some(name);
        }
        if let Some(date) = self.date {
            event.date = Some(date);
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
    }
}
