//! The built-in researcher, writer and editor stages.

use super::{Persona, StageSpec};
use crate::core::StageRole;

/// Returns the research stage.
#[must_use]
pub fn researcher() -> StageSpec {
    StageSpec::new(
        StageRole::Research,
        Persona::new(
            "Senior Research Analyst",
            "Gather comprehensive, accurate information about the given topic and organize it \
             into clear, structured bullet points.",
            "You are a meticulous researcher with years of experience. You excel at breaking \
             down complex topics into digestible, well-organized points. Your research is always \
             fact-based, structured, and covers all important aspects of a topic.",
        ),
        "Research the topic: '{topic}'. Break down the topic into 6-8 key points covering all \
         important aspects. Each point should be a clear, concise bullet point with brief \
         explanations. Focus on accuracy, completeness, and logical organization.",
    )
    .with_expected_output(
        "A structured list of 6-8 bullet points with brief explanations covering all important \
         aspects of the topic.",
    )
}

/// Returns the writing stage.
#[must_use]
pub fn writer() -> StageSpec {
    StageSpec::new(
        StageRole::Writing,
        Persona::new(
            "Content Writer & Educator",
            "Transform research notes into a clear, engaging, and beginner-friendly written \
             explanation.",
            "You are a skilled writer who specializes in making complex topics accessible. You \
             take raw research and turn it into polished, easy-to-understand content. Your \
             writing style is friendly, clear, and uses simple examples. You excel at creating \
             engaging narratives from structured data.",
        ),
        "Using the research notes provided by the Researcher, write a comprehensive, \
         beginner-friendly explanation of '{topic}'. The explanation should be 5-6 paragraphs \
         long. Use simple language, include examples where helpful, and make it engaging. \
         Write for a college student audience.",
    )
    .with_expected_output(
        "A polished 5-6 paragraph explanation that is clear, engaging, and educational.",
    )
}

/// Returns the editing stage.
#[must_use]
pub fn editor() -> StageSpec {
    StageSpec::new(
        StageRole::Editing,
        Persona::new(
            "Content Editor & Quality Reviewer",
            "Review written content for clarity, accuracy, flow, and overall quality. Improve it \
             while maintaining the original message.",
            "You are an experienced editor with a keen eye for detail. You review content for \
             grammar, clarity, logical flow, and engagement. You improve content while \
             preserving the writer's voice and message. You ensure the final output is polished, \
             professional, and easy to understand.",
        ),
        "Review the content written by the Writer. Check for clarity, flow, grammar, and \
         overall quality. Improve the content while maintaining the writer's voice and message. \
         Ensure it's polished, professional, and easy to understand. Make any necessary \
         improvements and provide the final version.",
    )
    .with_expected_output(
        "A polished, edited version of the content that is clear, well-structured, and \
         professional.",
    )
}

/// Returns the three built-in stages in execution order.
#[must_use]
pub fn default_stages() -> [StageSpec; 3] {
    [researcher(), writer(), editor()]
}
