//! Profile wizard — the linear intake flow that builds a `CustomerProfile`.
//!
//! The wizard walks a fixed sequence of steps with no skipping and no
//! caller-visible backward transition. The only side-effectful step is
//! `Requesting`, which hands the completed profile to the recommendation
//! requester.

pub mod questions;
pub mod session;
pub mod state;

pub use questions::{INITIAL_QUESTIONS, IntakeAnswers, followup_questions};
pub use session::{ChatEntry, ChatReply, ChatRole, Session};
pub use state::SessionStep;
