//! Server-side offline batch processing.
//!
//! Replays client-captured check-ins idempotently. Records are processed
//! sequentially so the per-record first-timer tag cleanup keeps its
//! ordering; per-record failures are collected and never abort the
//! batch. Time-window validation is deliberately skipped here - offline
//! scans may be replayed hours after the event ended.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::metrics::record_sync_records;
use crate::services::tag_lifecycle::TagLifecycleService;
use domain::models::sync::{SyncBatchResponse, SyncError, SyncRecord};
use domain::models::tag::system_tags;
use persistence::repositories::AttendanceRepository;
use shared::clock::SharedClock;

/// True when the error is the attendance unique violation (a concurrent
/// flush already inserted the record).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

/// Service replaying offline check-in batches.
#[derive(Clone)]
pub struct SyncService {
    attendance: AttendanceRepository,
    tag_lifecycle: TagLifecycleService,
}

impl SyncService {
    /// Creates a new SyncService over the given pool.
    pub fn new(pool: PgPool, clock: SharedClock) -> Self {
        Self {
            attendance: AttendanceRepository::new(pool.clone()),
            tag_lifecycle: TagLifecycleService::new(pool, clock),
        }
    }

    /// Process one batch of offline records.
    ///
    /// Each record: skip if an attendance row already exists (idempotent
    /// replay), otherwise insert using the client-observed timestamp and
    /// clear the member's pending-first-attendance tag.
    pub async fn process_batch(&self, records: &[SyncRecord]) -> Result<SyncBatchResponse, ApiError> {
        let total_received = records.len();
        let mut synced_count = 0usize;
        let mut skipped = 0usize;
        let mut errors: Vec<SyncError> = Vec::new();

        for record in records {
            match self
                .attendance
                .find_by_member_event(record.member_id, record.event_id)
                .await
            {
                Ok(Some(_)) => {
                    skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(err) => {
                    errors.push(SyncError {
                        member_id: record.member_id,
                        event_id: record.event_id,
                        reason: format!("lookup failed: {}", err),
                    });
                    continue;
                }
            }

            match self
                .attendance
                .insert(
                    record.member_id,
                    record.event_id,
                    record.method.as_str(),
                    record.timestamp,
                )
                .await
            {
                Ok(_) => {
                    synced_count += 1;
                    // Same first-timer cleanup as an online check-in; a
                    // cleanup failure downgrades to a warning rather than
                    // failing an already-recorded attendance.
                    if let Err(err) = self
                        .tag_lifecycle
                        .remove_role_tag(
                            record.member_id,
                            system_tags::PENDING_FIRST_ATTENDANCE,
                            Some(record.member_id),
                        )
                        .await
                    {
                        warn!(
                            member_id = %record.member_id,
                            error = %err,
                            "First-attendance cleanup failed during sync"
                        );
                    }
                }
                Err(err) if is_unique_violation(&err) => {
                    // Lost the race against a concurrent flush; the
                    // record is already synced.
                    skipped += 1;
                }
                Err(err) => {
                    errors.push(SyncError {
                        member_id: record.member_id,
                        event_id: record.event_id,
                        reason: format!("insert failed: {}", err),
                    });
                }
            }
        }

        record_sync_records(synced_count, skipped, errors.len());
        info!(
            synced = synced_count,
            skipped,
            failed = errors.len(),
            total = total_received,
            "Offline batch processed"
        );

        Ok(SyncBatchResponse {
            synced_count,
            total_received,
            errors,
        })
    }
}
