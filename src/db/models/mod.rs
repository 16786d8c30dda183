pub mod assignment;
pub mod label;

pub use assignment::{LabelAssignment, NewAssignment};
pub use label::Label;
