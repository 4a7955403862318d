use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stagecrew::credentials::DEFAULT_SECRETS_PATH;
use stagecrew::observability::LogFormat;
use stagecrew::providers::{GeneratorConfig, DEFAULT_MODEL};

#[derive(Debug, Parser)]
#[command(name = "stagecrew")]
#[command(author, version, about = "Research, write and edit an explanation of any topic", long_about = None)]
pub struct Cli {
    /// Topic to research and explain
    #[arg(required = true, num_args = 1.., value_name = "TOPIC")]
    pub topic: Vec<String>,

    /// Model used by every stage
    #[arg(short, long, env = "STAGECREW_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Print the research notes and draft before the final text
    #[arg(long)]
    pub show_stages: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the final text to <DIR>/<Topic>_content.txt (default: current directory)
    #[arg(long, value_name = "DIR", num_args = 0..=1, require_equals = true, default_missing_value = ".")]
    pub save: Option<PathBuf>,

    /// JSON secrets file consulted when GOOGLE_API_KEY is not set
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SECRETS_PATH)]
    pub secrets: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120.0)]
    pub timeout: f64,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens per stage response
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for the finished run.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// The topic words joined back into one string.
    pub fn topic(&self) -> String {
        self.topic.join(" ")
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new()
            .with_model(&self.model)
            .with_timeout(self.timeout);
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(tokens) = self.max_output_tokens {
            config = config.with_max_output_tokens(tokens);
        }
        config
    }

    pub const fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }

    pub const fn log_directive(&self) -> &'static str {
        if self.verbose {
            "stagecrew=debug,stagecrew_cli=debug"
        } else {
            "stagecrew=info,stagecrew_cli=info"
        }
    }
}
