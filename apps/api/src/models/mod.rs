pub mod profile;
pub mod records;
pub mod section;

use thiserror::Error;

/// A stored enum column held a value this build does not know about.
#[derive(Debug, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: String) -> Self {
        UnknownVariant { kind, value }
    }
}
