//! Test assertions for pipeline runs.

use crate::core::{PipelineRun, StageRole};
use crate::testing::ScriptedGenerator;

/// Asserts that every stage after the first received the previous stage's
/// full output as context, and that the first received none.
pub fn assert_context_chained(run: &PipelineRun, generator: &ScriptedGenerator) {
    for role in StageRole::ALL {
        let call = generator
            .call_for(role)
            .unwrap_or_else(|| panic!("Expected {role} stage to be invoked"));

        match role.previous() {
            None => assert!(
                call.context.is_none(),
                "Expected {role} stage to receive no context, got {:?}",
                call.context
            ),
            Some(previous) => {
                let expected = &run.stage(previous).text;
                let context = call.context.as_deref().unwrap_or_default();
                assert!(
                    context.contains(expected.as_str()),
                    "Expected {role} context to contain the {previous} output verbatim.\n\
                     output: {expected:?}\ncontext: {context:?}"
                );
            }
        }
    }
}

/// Asserts that exactly the given stages were invoked, in order.
pub fn assert_invoked_in_order(generator: &ScriptedGenerator, expected: &[StageRole]) {
    let actual: Vec<StageRole> = generator.calls().iter().map(|c| c.stage).collect();
    assert_eq!(
        actual, expected,
        "Expected stages {expected:?} to be invoked, got {actual:?}"
    );
}

/// Asserts that no generation call was made.
pub fn assert_not_invoked(generator: &ScriptedGenerator) {
    assert_eq!(
        generator.call_count(),
        0,
        "Expected no generation calls, got {:?}",
        generator.calls()
    );
}
