mod assignments;
mod labels;
