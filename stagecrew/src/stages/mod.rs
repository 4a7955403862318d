//! Stage specifications.
//!
//! A stage is a persona plus a task template. The pipeline always runs
//! exactly three of them: research, writing, editing.

mod personas;
mod spec;

pub use personas::{default_stages, editor, researcher, writer};
pub use spec::{Persona, StageSpec, TOPIC_PLACEHOLDER};
