use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Oldest age still booked as a child.
pub const MAX_CHILD_AGE: u8 = 13;

pub fn is_valid_child_age(age: u8) -> bool {
    age <= MAX_CHILD_AGE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchSelection {
    pub id: String,
    pub display_name: String,
    pub layer_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
}

/// The in-progress booking, owned by whichever screen is currently open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingDraft {
    pub stay_from: Option<NaiveDate>,
    pub stay_to: Option<NaiveDate>,
    pub guest_count: u32,
    /// Child ages in the order they were added. Repeats are separate children.
    pub children: Vec<u8>,
    pub contact: Contact,
    pub pitch: Option<PitchSelection>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        BookingDraft {
            stay_from: None,
            stay_to: None,
            guest_count: 1,
            children: Vec::new(),
            contact: Contact::default(),
            pitch: None,
        }
    }
}

impl BookingDraft {
    /// Append a child age. Returns `false` (and leaves the list alone) when
    /// the age is out of range.
    pub fn add_child(&mut self, age: u8) -> bool {
        if !is_valid_child_age(age) {
            return false;
        }
        self.children.push(age);
        true
    }

    pub fn remove_child(&mut self, index: usize) -> Option<u8> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Number of nights, once both dates are set and ordered.
    pub fn nights(&self) -> Option<i64> {
        match (self.stay_from, self.stay_to) {
            (Some(from), Some(to)) if to >= from => Some((to - from).num_days()),
            _ => None,
        }
    }
}

/// JSON object handed to the host when the booking is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub guests: u32,
    pub children_count: usize,
    pub children_ages: Vec<u8>,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_name: Option<String>,
}
