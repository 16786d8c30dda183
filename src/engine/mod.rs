//! The assignment table engine: one label's assignments, sorted, filtered,
//! paged and selectable, plus the confirm-then-delete flow.

pub mod controller;
pub mod record;
pub mod state;
pub mod view;

pub use controller::{AssignmentTable, LoadOutcome};
pub use record::AssignmentRecord;
pub use state::{DeleteTarget, DisplayState, TableSnapshot, TableState};
pub use view::{SortDirection, SortKey};
