//! Infrastructure layer - Override sources and manifest files

pub mod manifest;
pub mod source;

pub use manifest::Manifest;
pub use source::{split_list, EnvSource, MapSource, OverrideSource};
