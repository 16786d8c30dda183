pub mod selector;

pub use selector::{LabelDeleted, LabelOption, LabelSelection, LabelSelector};
