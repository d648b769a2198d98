pub mod conversation;
pub mod generation;
pub mod project;
