//! Standardized metrics collection and reporting for CI integration.
//!
//! Metrics are exported as JSON for automated analysis and regression
//! detection of light propagation cost.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (ISO 8601)
    pub timestamp: String,

    /// Overall test result
    pub result: TestResult,

    /// Light propagation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lighting: Option<LightingMetrics>,

    /// Overlay compositing metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compositing: Option<CompositingMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
}

/// Light propagation cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingMetrics {
    /// Grid dimensions `[cols, rows]`
    pub grid: [usize; 2],

    /// Full initialization time (microseconds)
    pub initialize_time_us: f64,

    /// Incremental updates performed
    pub total_updates: usize,

    /// Walks processed across all updates
    pub total_walks: usize,

    /// Directional inputs rewritten across all updates
    pub cells_written: usize,

    /// Largest number of inputs rewritten by one update
    pub max_cells_written: usize,

    /// Average time per update (microseconds)
    pub avg_update_time_us: f64,

    /// Light updates per second
    pub updates_per_second: f64,
}

/// Sampling and compositing cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositingMetrics {
    /// Frames prepared and applied
    pub frames: usize,

    /// Light nodes sampled per frame
    pub nodes_per_frame: usize,

    /// Scratch buffer reallocations
    pub reallocations: usize,

    /// Average prepare + apply time (microseconds)
    pub avg_frame_time_us: f64,
}

/// Test execution metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                lighting: None,
                compositing: None,
                test_execution: TestExecutionMetrics {
                    duration_seconds: 0.0,
                    assertions_checked: None,
                },
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set lighting metrics
    pub fn lighting(mut self, metrics: LightingMetrics) -> Self {
        self.report.lighting = Some(metrics);
        self
    }

    /// Set compositing metrics
    pub fn compositing(mut self, metrics: CompositingMetrics) -> Self {
        self.report.compositing = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "wrote metrics report");
        Ok(())
    }
}
