//! Virtual and stored occurrences produced by window queries.

use jiff::civil;
use serde::Serialize;

use super::{ItemStatus, PlanItem};

/// One entry in a date-window view: either a stored plan item or a virtual
/// occurrence computed from a recurring template.
///
/// Virtual occurrences are not persisted; they converge to `Stored` the first
/// time they are touched (toggled or edited), at which point a concrete
/// record addressed by `(template_id, occurrence_date)` takes over.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Occurrence {
    /// A persisted plan item due in the window
    Stored(PlanItem),

    /// A computed occurrence of a recurring template, not yet persisted.
    /// The snapshot mirrors the template's fields with the occurrence date
    /// as its due date and an untouched todo status.
    Virtual {
        template_id: u64,
        date: civil::Date,
        snapshot: PlanItem,
    },
}

impl Occurrence {
    /// The plan item view of this entry, stored or snapshot.
    pub fn item(&self) -> &PlanItem {
        match self {
            Occurrence::Stored(item) => item,
            Occurrence::Virtual { snapshot, .. } => snapshot,
        }
    }

    /// Whether this entry is a computed, unpersisted occurrence.
    pub fn is_virtual(&self) -> bool {
        matches!(self, Occurrence::Virtual { .. })
    }

    /// Status of the underlying item. Virtual occurrences are always todo.
    pub fn status(&self) -> ItemStatus {
        self.item().status
    }

    /// Due date of the underlying item, when it has one.
    pub fn due_date(&self) -> Option<civil::Date> {
        match self {
            Occurrence::Stored(item) => item.due_date,
            Occurrence::Virtual { date, .. } => Some(*date),
        }
    }
}
