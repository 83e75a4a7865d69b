pub mod document;
pub mod registry;
