//! Recipes over Java sources.
//!
//! Each follows the same shape: locate targets with the structural
//! matchers, plan byte-range edits, and let the formatting helpers repair
//! whatever the edit made adjacent. Anything ambiguous is declined — a
//! batch run over a large codebase must skip what it cannot migrate
//! confidently, never guess and never abort.

mod annotation_attribute;
mod change_type;
mod constructor_injection;
mod remove_invocations;

pub use annotation_attribute::RemoveAnnotationAttribute;
pub use change_type::{ChangeType, ChangeValidationAnnotations, MSG_VALIDATION_API_REQUIRED};
pub use constructor_injection::FieldInjectionToConstructorInjection;
pub use remove_invocations::RemoveMethodInvocations;
