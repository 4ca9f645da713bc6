//! Partitioning several documents at once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::{OpenApiSplitExt, SplitPathsByTag};
use crate::error::DocumentError;
use crate::load::load_document;

/// Name of the root document written for each input.
pub const ROOT_FILE: &str = "openapi.yaml";

/// The outcome of one input of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The input document.
    pub input: PathBuf,
    /// The directory the partition was written to.
    pub output_dir: PathBuf,
    /// The written files, or why the input could not be processed.
    pub result: Result<Vec<PathBuf>, DocumentError>,
}

/// Outcomes of a batch, sorted by input path.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per input.
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Outcomes of the inputs that were partitioned.
    pub fn succeeded(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_ok())
    }

    /// Outcomes of the inputs that failed.
    pub fn failed(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }

    /// Returns `true` if every input was partitioned.
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Partitions each input into its own subdirectory of `out_dir`, named after the
/// input file stem.
///
/// A failing input is logged and reported, the other inputs are still processed.
pub fn split_files(inputs: &[PathBuf], out_dir: &Path, splitter: &SplitPathsByTag) -> BatchReport {
    let mut inputs = inputs.to_vec();
    inputs.sort();
    inputs.dedup();

    let mut used_dirs = HashSet::new();
    let mut report = BatchReport::default();

    for input in inputs {
        let output_dir = out_dir.join(output_name(&input, &mut used_dirs));
        let result = load_document(&input).and_then(|spec| {
            spec.split_with(splitter)
                .write_to(&output_dir, ROOT_FILE)
        });

        match &result {
            Ok(files) => {
                info!(input = %input.display(), files = files.len(), "document split");
            }
            Err(err) => {
                error!(input = %input.display(), %err, "failed to split document");
            }
        }
        report.outcomes.push(BatchOutcome {
            input,
            output_dir,
            result,
        });
    }

    report
}

fn output_name(input: &Path, used: &mut HashSet<String>) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "spec".to_string());

    let mut name = stem.clone();
    let mut suffix = 2_usize;
    while !used.insert(name.clone()) {
        name = format!("{stem}-{suffix}");
        suffix += 1;
    }
    name
}
