use rowdelta_diff::RowSet;
use rowdelta_types::{Column, DataSet};
use rowdelta_verify::{Delta, ErrorLog};
use tracing::debug;

use crate::checkpoint::Checkpoint;
use crate::error::{ObserveError, ObserveResult};
use crate::source::SnapshotProvider;

/// Construction-time settings for an [`Observer`].
#[derive(Clone, Debug, Default)]
pub struct ObserverConfig {
    /// Log that receives the report of every failed delta check.
    pub error_log: Option<ErrorLog>,
}

impl ObserverConfig {
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }
}

/// Tracks the state of a data source across checkpoints.
///
/// The observer owns `S`; pass `&table` to observe something owned
/// elsewhere.
pub struct Observer<S> {
    source: S,
    columns: Vec<Column>,
    baseline: RowSet,
    error_log: Option<ErrorLog>,
    checkpoints: u64,
}

impl<S: SnapshotProvider> Observer<S> {
    /// Observe `source`, reading its current contents as the baseline.
    pub fn new(source: S) -> ObserveResult<Self> {
        Self::with_config(source, ObserverConfig::default())
    }

    pub fn with_config(source: S, config: ObserverConfig) -> ObserveResult<Self> {
        let baseline = source.query()?;
        let columns = source.columns().to_vec();
        debug!(rows = baseline.len(), "observer baseline read from source");
        Ok(Self {
            source,
            columns,
            baseline,
            error_log: config.error_log,
            checkpoints: 0,
        })
    }

    /// Observe `source`, taking `initial` as its current contents.
    ///
    /// The source is not queried. If `initial` does not match what the
    /// source actually holds, the first delta will report the difference.
    pub fn with_baseline(source: S, initial: &DataSet) -> ObserveResult<Self> {
        Self::with_baseline_and_config(source, initial, ObserverConfig::default())
    }

    pub fn with_baseline_and_config(
        source: S,
        initial: &DataSet,
        config: ObserverConfig,
    ) -> ObserveResult<Self> {
        let columns = source.columns().to_vec();
        if let Some(bound) = initial.columns() {
            if bound != columns.as_slice() {
                return Err(ObserveError::InvalidUsage(format!(
                    "initial data bound to columns [{}], source has [{}]",
                    join(bound),
                    join(&columns)
                )));
            }
        }
        if let Some(bad) = initial.iter().find(|r| r.len() != columns.len()) {
            return Err(ObserveError::InvalidUsage(format!(
                "initial row {bad} has {} value(s), source has {} column(s)",
                bad.len(),
                columns.len()
            )));
        }
        Ok(Self {
            source,
            columns,
            baseline: RowSet::from(initial),
            error_log: config.error_log,
            checkpoints: 0,
        })
    }

    /// Changes since the previous checkpoint.
    ///
    /// The source is re-queried and the result becomes the new baseline,
    /// whether or not the returned delta is later verified.
    pub fn delta(&mut self) -> ObserveResult<Delta> {
        let snapshot = self.source.query()?;
        let delta = Delta::new(&self.baseline, &snapshot)?;
        self.baseline = snapshot;
        self.checkpoints += 1;
        debug!(
            checkpoint = self.checkpoints,
            removed = delta.pending_removed().len(),
            added = delta.pending_added().len(),
            "observer checkpoint"
        );

        let mut delta = delta.with_columns(self.columns.clone());
        delta.set_error_log(self.error_log.clone());
        Ok(delta)
    }

    /// Set (or clear) the log used by deltas created from now on.
    pub fn log_errors_to(&mut self, log: Option<ErrorLog>) -> &mut Self {
        self.error_log = log;
        self
    }

    pub fn baseline(&self) -> &RowSet {
        &self.baseline
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn error_log(&self) -> Option<&ErrorLog> {
        self.error_log.as_ref()
    }

    /// Number of deltas produced so far.
    pub fn checkpoints(&self) -> u64 {
        self.checkpoints
    }
}

impl<S: SnapshotProvider> Checkpoint for Observer<S> {
    type Delta = Delta;

    fn checkpoint(&mut self) -> ObserveResult<Delta> {
        self.delta()
    }
}

impl<S> std::fmt::Debug for Observer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("columns", &self.columns)
            .field("baseline_rows", &self.baseline.len())
            .field("checkpoints", &self.checkpoints)
            .finish_non_exhaustive()
    }
}

fn join(columns: &[Column]) -> String {
    columns
        .iter()
        .map(Column::name)
        .collect::<Vec<_>>()
        .join(", ")
}
