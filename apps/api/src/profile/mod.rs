// Profile management: validation, derived values, persistence and the
// completeness report.

pub mod completeness;
pub mod dates;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod store;
pub mod validation;
