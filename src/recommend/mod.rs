//! Recommendation requester — query-context synthesis and the single call
//! to the hosted query engine.

pub mod prompts;
pub mod requester;

pub use prompts::{build_query_context, question_context};
pub use requester::{Requester, update_field};
