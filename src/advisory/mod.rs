//! Advisory generation: severity, dominant cause, recommendation text and
//! structured care actions.

pub mod types;
pub mod templates;
pub mod generator;

pub use types::{Advisory, CareAction, DominantCause, Severity, StressFactors};
pub use generator::{classify_severity, dominant_cause, generate_advisory, heat_factor, stress_factors};
