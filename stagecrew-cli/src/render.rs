use std::fmt::Write;

use stagecrew::core::PipelineRun;

/// Renders the run as plain text.
///
/// With `show_stages` every stage result is printed under its own heading;
/// otherwise only the final text is.
pub fn render_text(run: &PipelineRun, show_stages: bool) -> String {
    if !show_stages {
        return run.final_text().to_string();
    }

    let mut out = String::new();
    for (i, result) in run.stages().iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "## {}\n", result.role.title());
        out.push_str(&result.text);
    }
    out
}

pub fn render_json(run: &PipelineRun) -> serde_json::Result<String> {
    serde_json::to_string_pretty(run)
}

/// One-line run statistics for stderr.
pub fn render_summary(run: &PipelineRun) -> String {
    let seconds = run.duration_ms() as f64 / 1000.0;
    let tokens = run.total_tokens();
    if tokens == 0 {
        format!("Completed 3 stages in {seconds:.1}s")
    } else {
        format!("Completed 3 stages in {seconds:.1}s using {tokens} tokens")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stagecrew::testing::sample_run;

    #[test]
    fn test_render_text_final_only() {
        let run = sample_run("Rust", "- notes", "draft", "final text");
        assert_eq!(render_text(&run, false), "final text");
    }

    #[test]
    fn test_render_text_with_stages() {
        let run = sample_run("Rust", "- notes", "draft", "final text");

        assert_eq!(
            render_text(&run, true),
            "## Research notes\n\n- notes\n\n## Draft\n\ndraft\n\n## Final edited content\n\nfinal text"
        );
    }

    #[test]
    fn test_render_json_contains_every_stage() {
        let run = sample_run("Quantum Computing", "- notes", "draft", "final text");

        let value: serde_json::Value = serde_json::from_str(&render_json(&run).unwrap()).unwrap();

        assert_eq!(value["topic"], "Quantum Computing");
        assert_eq!(value["run_id"], run.run_id.to_string().as_str());
        assert_eq!(value["stages"][0]["role"], "research");
        assert_eq!(value["stages"][1]["text"], "draft");
        assert_eq!(value["stages"][2]["text"], "final text");
    }

    #[test]
    fn test_render_summary() {
        let run = sample_run("Rust", "- notes", "draft", "final");
        assert_eq!(render_summary(&run), "Completed 3 stages in 2.4s");
    }
}
