//! Analysis progress reporting.
//!
//! Reports observable progress during `comics analyze` so users see how many
//! strips have been scored and how many failed along the way. Progress is
//! emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for an analysis run.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalyzeProgressEvent {
    /// Scoring phase: `n` items processed out of `total`, `failed` of them failed.
    Scoring { n: u64, total: u64, failed: u64 },
    /// All scoring finished (or was interrupted); yearly aggregation is running.
    Aggregating { scored: u64 },
}

/// Reports analysis progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the pipeline.
    fn report(&self, event: AnalyzeProgressEvent);
}

/// Human-friendly progress on stderr: "analyze  scoring  1,200 / 9,000 comics (3 failed)".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: AnalyzeProgressEvent) {
        let line = match &event {
            AnalyzeProgressEvent::Scoring { n, total, failed } => format!(
                "analyze  scoring  {} / {} comics ({} failed)\n",
                format_number(*n),
                format_number(*total),
                format_number(*failed)
            ),
            AnalyzeProgressEvent::Aggregating { scored } => {
                format!("analyze  aggregating {} scores\n", format_number(*scored))
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: AnalyzeProgressEvent) {
        let obj = match &event {
            AnalyzeProgressEvent::Scoring { n, total, failed } => serde_json::json!({
                "event": "progress",
                "phase": "scoring",
                "n": n,
                "total": total,
                "failed": failed
            }),
            AnalyzeProgressEvent::Aggregating { scored } => serde_json::json!({
                "event": "progress",
                "phase": "aggregating",
                "scored": scored
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: AnalyzeProgressEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
