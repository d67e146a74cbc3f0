//! Application layer - Tag managers and the instance registry

pub mod manager;
pub mod registry;

pub use manager::TagManager;
pub use registry::Registry;
