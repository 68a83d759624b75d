//! Work-time patterns: templates used to pre-fill time-cards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clock::TimeOfDay;

/// A break inside a work slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSlot {
    /// Break start.
    pub start: TimeOfDay,
    /// Break end.
    pub end: TimeOfDay,
}

/// One named working time (e.g. day shift, night shift).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSlot {
    /// Slot name.
    pub name: String,
    /// Work start.
    pub start: TimeOfDay,
    /// Work end.
    pub end: TimeOfDay,
    /// Breaks in display order.
    #[serde(default)]
    pub breaks: Vec<BreakSlot>,
}

/// An ordered set of work slots. Carries no calculation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTimePattern {
    /// Unique identifier.
    pub id: Uuid,
    /// Pattern name.
    pub name: String,
    /// Slots in display order.
    pub slots: Vec<WorkSlot>,
}

impl WorkTimePattern {
    /// Finds a slot by name.
    pub fn slot(&self, name: &str) -> Option<&WorkSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}
