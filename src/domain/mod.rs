//! Domain layer - Tag declarations, expressions and activation

pub mod descriptor;
pub mod evaluator;
pub mod expression;
pub mod label;
pub mod presets;
pub mod registration;
pub mod store;

pub use descriptor::{Declaration, TagDescriptor, TagPlan};
pub use evaluator::{evaluate_expression, is_any_active, LabelActivation};
pub use expression::{Expression, Operator};
pub use label::labelify;
pub use presets::{Presets, DEFAULT_NAMESPACE};
pub use registration::resolve_declarations;
pub use store::TagStore;
