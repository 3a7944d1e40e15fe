use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compare::ComparisonVerdict;
use crate::engine::DualLoadResult;
use crate::query::TimeWindow;
use crate::results::{LatencyDistribution, LatencyRatios};

// ---------------------------------------------------------------------------
// LoadComparison
// ---------------------------------------------------------------------------

/// Side-by-side load statistics for one file, with candidate/reference ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadComparison {
    pub reference: LatencyDistribution,
    pub candidate: LatencyDistribution,
    pub ratios: LatencyRatios,
}

impl LoadComparison {
    pub fn new(reference: LatencyDistribution, candidate: LatencyDistribution) -> Self {
        let ratios = LatencyRatios::between(&reference, &candidate);
        Self {
            reference,
            candidate,
            ratios,
        }
    }
}

impl From<DualLoadResult> for LoadComparison {
    fn from(result: DualLoadResult) -> Self {
        Self::new(result.reference, result.candidate)
    }
}

// ---------------------------------------------------------------------------
// FileReport
// ---------------------------------------------------------------------------

/// Everything produced for one test-definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FileReport {
    pub path: PathBuf,
    /// One verdict per test, in definition order. Empty when comparison mode
    /// is off.
    pub verdicts: Vec<ComparisonVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadComparison>,
}

impl FileReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verdicts: Vec::new(),
            load: None,
        }
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn failed(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.equivalent).count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }
}

/// A file that could not be loaded. It does not count toward any totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// The folded result of a whole run.
///
/// Built by a single owner: each file's report is absorbed once it is
/// complete, so the counters never need locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub window: TimeWindow,
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
    pub total_tests: usize,
    pub failed_tests: usize,
    /// The run stopped early on an interrupt; later files were not visited.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            started_at: Utc::now(),
            window,
            files: Vec::new(),
            skipped: Vec::new(),
            total_tests: 0,
            failed_tests: 0,
            interrupted: false,
        }
    }

    pub fn absorb(&mut self, report: FileReport) {
        self.total_tests += report.total();
        self.failed_tests += report.failed();
        self.files.push(report);
    }

    pub fn skip(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            path: path.into(),
            reason: reason.into(),
        });
    }

    pub fn passed_tests(&self) -> usize {
        self.total_tests - self.failed_tests
    }

    pub fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }

    /// Files whose load run produced statistics.
    pub fn load_comparisons(&self) -> impl Iterator<Item = (&FileReport, &LoadComparison)> {
        self.files
            .iter()
            .filter_map(|f| f.load.as_ref().map(|l| (f, l)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
