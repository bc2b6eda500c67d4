/// Statistics of one engine invocation over a single channel.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunRecord {
    /// `changes / possible_changes` for every marked pixel, in mask-scan order.
    pub change_ratios: Vec<f64>,
    /// Fraction of marked pixels whose window median never reached the target.
    pub no_success_fraction: f64,
}

impl RunRecord {
    /// Mean of [`RunRecord::change_ratios`]; `None` when the record has no windows.
    pub fn mean_change_ratio(&self) -> Option<f64> {
        if self.change_ratios.is_empty() {
            return None;
        }
        Some(self.change_ratios.iter().sum::<f64>() / self.change_ratios.len() as f64)
    }
}

/// Caller-owned, append-only accumulator of [`RunRecord`]s.
///
/// Each channel of each attacked image appends one record. Nothing in the crate clears it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunStatistics {
    runs: Vec<RunRecord>,
}

impl RunStatistics {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: RunRecord) {
        self.runs.push(record);
    }

    /// All records, oldest first.
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    /// Most recent record.
    pub fn last_run(&self) -> Option<&RunRecord> {
        self.runs.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Return `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Per-run change ratios, in the shape plotting code expects.
    pub fn changed_pixels(&self) -> Vec<&[f64]> {
        self.runs.iter().map(|r| r.change_ratios.as_slice()).collect()
    }

    /// Per-run no-success fractions.
    pub fn no_success(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.no_success_fraction).collect()
    }

    /// Mean change ratio over every window of every run.
    pub fn mean_change_ratio(&self) -> Option<f64> {
        let (sum, n) = self
            .runs
            .iter()
            .flat_map(|r| r.change_ratios.iter())
            .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }
}
