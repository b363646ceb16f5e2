//! Customer profile data model and intake-text classifiers.

pub mod classify;
pub mod model;

pub use classify::{concise_summary, interpret_experience, interpret_flexibility};
pub use model::{CustomerProfile, Experience, Flexibility, Persona, PersonaAnswers};
