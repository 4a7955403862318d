//! Writing a run's final text as a downloadable file.

use crate::core::{PipelineRun, Topic};
use std::path::{Path, PathBuf};
use tracing::info;

/// Suffix appended to every download file name.
pub const DOWNLOAD_SUFFIX: &str = "_content.txt";

/// Derives the download file name for a topic.
///
/// Every space becomes an underscore; nothing else is escaped.
///
/// ```
/// use stagecrew::core::Topic;
/// use stagecrew::export::download_file_name;
///
/// let topic = Topic::parse("Quantum Computing").unwrap();
/// assert_eq!(download_file_name(&topic), "Quantum_Computing_content.txt");
/// ```
#[must_use]
pub fn download_file_name(topic: &Topic) -> String {
    format!("{}{DOWNLOAD_SUFFIX}", topic.as_str().replace(' ', "_"))
}

/// Writes the run's final text as UTF-8 into `dir` and returns the file path.
///
/// An existing file with the same name is overwritten.
///
/// # Errors
///
/// Returns an I/O error if the directory does not exist or is not writable.
pub fn write_download(dir: &Path, run: &PipelineRun) -> std::io::Result<PathBuf> {
    let path = dir.join(download_file_name(&run.topic));
    std::fs::write(&path, run.final_text())?;
    info!(path = %path.display(), bytes = run.final_text().len(), "Wrote download file");
    Ok(path)
}
