//! Inspection of an Echidna corpus directory.
//!
//! Echidna writes `covered.<timestamp>.txt` coverage reports, per-input
//! coverage sequences under `coverage/` and failing sequences under
//! `reproducers/`. File lists are sorted by path so that "the first coverage
//! file" is stable across filesystems.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;
use tracing::debug;

pub const COVERAGE_PATTERN: &str = "**/covered.*.txt";
pub const TEST_CASE_PATTERN: &str = "**/coverage/*.txt";
pub const REPRODUCER_PATTERN: &str = "**/reproducers/*.txt";

/// Characters of the first coverage file included in a corpus report.
pub const SAMPLE_CHARS: usize = 500;
/// Lines of the newest coverage file included in a text visualization.
pub const PREVIEW_LINES: usize = 100;
/// Marker Echidna places on covered source lines.
pub const COVERED_MARKER: char = '*';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSample {
    pub sample: String,
    /// Total length of the sampled file, in characters.
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub corpus_dir: String,
    pub coverage_files: Vec<String>,
    pub test_cases: Vec<String>,
    pub reproducers: Vec<String>,
    pub coverage_sample: Option<CoverageSample>,
}

/// Find files under `root` matching `pattern`, sorted by path.
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
    let mut files: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("Invalid glob pattern: {}", full))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Drop `.` components so `./corpus/`, `corpus/` and glob output compare equal.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn relative_paths(root: &Path, files: &[PathBuf]) -> Result<Vec<String>> {
    let root = normalized(root);
    files
        .iter()
        .map(|path| {
            let path = normalized(path);
            path.strip_prefix(&root)
                .map(|rel| rel.to_string_lossy().to_string())
                .with_context(|| {
                    format!("{} is not inside {}", path.display(), root.display())
                })
        })
        .collect()
}

/// Read a text file with `\r\n` line endings folded to `\n`.
fn read_text(path: &Path) -> Result<String> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(if data.contains("\r\n") {
        data.replace("\r\n", "\n")
    } else {
        data
    })
}

fn ensure_corpus_dir(corpus_dir: &str) -> Result<&Path> {
    let root = Path::new(corpus_dir);
    if !root.exists() {
        bail!("Corpus directory {} does not exist", corpus_dir);
    }
    Ok(root)
}

/// Truncate to `limit` characters, appending `...` when anything was cut.
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Group the corpus files by kind and sample the first coverage report.
pub fn analyze_corpus(corpus_dir: &str) -> Result<CorpusReport> {
    let root = ensure_corpus_dir(corpus_dir)?;

    let coverage_files = find_files(root, COVERAGE_PATTERN)?;
    let test_cases = find_files(root, TEST_CASE_PATTERN)?;
    let reproducers = find_files(root, REPRODUCER_PATTERN)?;
    debug!(
        coverage = coverage_files.len(),
        test_cases = test_cases.len(),
        reproducers = reproducers.len(),
        "scanned corpus"
    );

    let coverage_sample = match coverage_files.first() {
        Some(first) => {
            let data = read_text(first)?;
            Some(CoverageSample {
                sample: truncate_chars(&data, SAMPLE_CHARS),
                size: data.chars().count(),
            })
        }
        None => None,
    };

    Ok(CorpusReport {
        corpus_dir: corpus_dir.to_string(),
        coverage_files: relative_paths(root, &coverage_files)?,
        test_cases: relative_paths(root, &test_cases)?,
        reproducers: relative_paths(root, &reproducers)?,
        coverage_sample,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Image,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "image" => Ok(OutputFormat::Image),
            other => bail!(
                "Unknown output format: {}. Supported formats: text, image",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageView {
    pub format: OutputFormat,
    pub coverage_file: String,
    pub coverage_data: String,
    pub total_lines: usize,
    pub covered_lines: usize,
}

/// The most recently modified coverage report under `root`.
///
/// Ties on modification time fall back to path order.
pub fn latest_coverage_file(root: &Path) -> Result<Option<PathBuf>> {
    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for path in find_files(root, COVERAGE_PATTERN)? {
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        candidates.push((modified, path));
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(candidates.into_iter().next().map(|(_, path)| path))
}

/// Text rendering of the newest coverage report.
pub fn coverage_text(corpus_dir: &str) -> Result<CoverageView> {
    let root = ensure_corpus_dir(corpus_dir)?;
    let Some(latest) = latest_coverage_file(root)? else {
        bail!("No coverage files found in corpus directory");
    };
    debug!(file = %latest.display(), "selected coverage file");

    let data = read_text(&latest)?;
    let lines: Vec<&str> = data.split_inclusive('\n').collect();

    let coverage_data = if lines.len() > PREVIEW_LINES {
        format!("{}...", lines[..PREVIEW_LINES].concat())
    } else {
        data.clone()
    };

    Ok(CoverageView {
        format: OutputFormat::Text,
        coverage_file: latest.to_string_lossy().to_string(),
        coverage_data,
        total_lines: lines.len(),
        covered_lines: lines
            .iter()
            .filter(|line| line.contains(COVERED_MARKER))
            .count(),
    })
}
