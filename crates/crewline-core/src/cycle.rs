//! One poll cycle: fetch, normalize, scope, diff, notify, persist.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, WatchConfig};
use crate::diff::{diff_snapshots, NewTripPolicy, SnapshotDiff};
use crate::format::{summarize_trip, NotificationFormatter, NotificationKind};
use crate::group::group_by_trip;
use crate::normalize::Normalizer;
use crate::ports::{NotificationSink, RecordSource, SnapshotStore, SourceError, StoreError};
use crate::scope::{AircraftCoverage, Scope};
use crate::types::Snapshot;

/// Failures that end a cycle early.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The session-expired notification has already been attempted.
    #[error("session expired: {message}")]
    AuthExpired { message: String },

    #[error(transparent)]
    Source(SourceError),

    #[error("failed to save snapshot: {0}")]
    Store(#[from] StoreError),
}

impl CycleError {
    /// Suggested exit code for the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthExpired { .. } => 3,
            Self::Source(_) | Self::Store(_) => 1,
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub message: String,
    /// Sink error text when delivery failed.
    pub error: Option<String>,
}

impl Delivery {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// What a successful cycle saw and did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub dropped: usize,
    pub synthesized_ids: usize,
    /// Upcoming in-scope flights, i.e. the saved snapshot size.
    pub upcoming: usize,
    pub trips: usize,
    pub coverage: AircraftCoverage,
    /// No usable previous snapshot: the current one was saved as baseline
    /// and nothing was compared.
    pub baseline: bool,
    pub diff: SnapshotDiff,
    pub deliveries: Vec<Delivery>,
}

impl CycleReport {
    pub fn sent(&self) -> usize {
        self.deliveries.iter().filter(|d| d.delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.sent()
    }
}

/// Configured pipeline; cheap to build once per process.
#[derive(Debug, Clone)]
pub struct PollCycle {
    normalizer: Normalizer,
    scope: Scope,
    policy: NewTripPolicy,
    timezone: Tz,
}

impl PollCycle {
    pub fn new(config: &WatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            normalizer: config.normalizer(),
            scope: config.scope(),
            policy: config.new_trip_policy,
            timezone: config.timezone()?,
        })
    }

    /// Run one cycle as of `now`.
    ///
    /// Collaborators are awaited strictly in sequence. A missing or unreadable
    /// previous snapshot makes this a baseline run. Notification failures are
    /// recorded in the report and never stop later notifications or the save.
    pub async fn run(
        &self,
        source: &dyn RecordSource,
        store: &dyn SnapshotStore,
        sink: &dyn NotificationSink,
        now: DateTime<Utc>,
    ) -> Result<CycleReport, CycleError> {
        let formatter = NotificationFormatter::new(self.timezone, now);

        let records = match source.fetch().await {
            Ok(records) => records,
            Err(SourceError::AuthExpired { message }) => {
                warn!(reason = %message, "session expired");
                if let Some(text) = formatter.format(NotificationKind::SessionExpired, &[]) {
                    deliver(sink, text).await;
                }
                return Err(CycleError::AuthExpired { message });
            }
            Err(error) => return Err(CycleError::Source(error)),
        };

        let mut report = CycleReport {
            fetched: records.len(),
            ..CycleReport::default()
        };

        let batch = self.normalizer.normalize_batch(&records);
        report.dropped = batch.dropped.len();
        report.synthesized_ids = batch.synthesized_ids;
        if batch.synthesized_ids > 0 {
            warn!(
                count = batch.synthesized_ids,
                "records without a source id cannot be tracked across polls"
            );
        }

        report.coverage = self.scope.coverage(&batch.flights);
        if !report.coverage.missing.is_empty() {
            warn!(missing = ?report.coverage.missing, "tracked aircraft absent from schedule");
        }

        let in_scope = self.scope.apply(batch.flights);
        let current = Snapshot::new(in_scope).upcoming(now);
        report.upcoming = current.len();

        let trips = group_by_trip(&current);
        report.trips = trips.len();
        info!(
            fetched = report.fetched,
            upcoming = report.upcoming,
            trips = report.trips,
            "schedule normalized"
        );
        for (key, legs) in &trips {
            if let Some(summary) = summarize_trip(legs) {
                info!(trip = %key, "{}", summary);
            }
        }

        let previous = match store.load().await {
            Ok(previous) => previous,
            Err(error) => {
                warn!(error = %error, "previous snapshot unusable; rebuilding baseline");
                None
            }
        };

        let Some(previous) = previous else {
            info!(flights = current.len(), "no previous snapshot; saving baseline");
            store.save(&current).await?;
            report.baseline = true;
            return Ok(report);
        };

        let diff = diff_snapshots(&previous, &current, now, self.policy);
        info!(
            new_trips = diff.new_trips.len(),
            crew_changes = diff.crew_changes.len(),
            updated_trips = diff.updated_trips.len(),
            "snapshot compared"
        );

        let new_trip_messages = diff
            .new_trips
            .values()
            .filter_map(|legs| formatter.format(NotificationKind::NewTrip, legs));
        let crew_messages = diff
            .crew_changes
            .iter()
            .filter_map(|change| formatter.format(NotificationKind::CrewChange, &change.legs));
        let messages: Vec<String> = new_trip_messages.chain(crew_messages).collect();

        for message in messages {
            report.deliveries.push(deliver(sink, message).await);
        }
        report.diff = diff;

        store.save(&current).await?;
        info!(
            sent = report.sent(),
            failed = report.failed(),
            "cycle complete"
        );
        Ok(report)
    }
}

async fn deliver(sink: &dyn NotificationSink, message: String) -> Delivery {
    match sink.send(&message).await {
        Ok(()) => {
            info!(message = %message, "notification sent");
            Delivery {
                message,
                error: None,
            }
        }
        Err(error) => {
            warn!(message = %message, error = %error, "notification failed");
            Delivery {
                message,
                error: Some(error.to_string()),
            }
        }
    }
}
