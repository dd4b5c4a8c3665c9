use crate::events::Event;
use crate::lazy::{EntityName, Lazy};
use crate::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Id,
    pub name: Option<String>,
    pub email: Option<String>,
    /// The event this attendee is registered for. Never serialized.
    #[serde(skip)]
    pub event: Lazy<Event>,
}

impl EntityName for Attendee {
    const NAME: &'static str = "Attendee";
}

/// Partial update for an `Attendee`. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AttendeePatch {
    pub fn apply_to(self, attendee: &mut Attendee) {
        if let Some(name) = self.name {
            attendee.name = Some(name);
        }
        if let Some(email) = self.email {
            attendee.email = Some(email);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_keeps_email_when_absent() {
        let mut attendee = Attendee {
            id: Id::new_v4(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            event: Lazy::unloaded(Id::new_v4()),
        };

        AttendeePatch {
            name: Some("Ada L.".to_string()),
            email: None,
        }
        .apply_to(&mut attendee);

        assert_eq!(attendee.name.as_deref(), Some("Ada L."));
        assert_eq!(attendee.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn serialized_attendee_omits_event_association() {
        let attendee = Attendee {
            id: Id::nil(),
            name: Some("Ada".to_string()),
            email: None,
            event: Lazy::unloaded(Id::new_v4()),
        };

        let value = serde_json::to_value(&attendee).unwrap();
        assert!(value.get("event").is_none());
    }
}
