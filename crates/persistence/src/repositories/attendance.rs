//! Attendance repositories for database operations.
//!
//! The UNIQUE (member_id, event_id) constraint on attendance is the real
//! duplicate-prevention mechanism; application pre-checks exist only for
//! friendlier error messages and are not a consistency guarantee under
//! races.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AttendanceEntity, AttendanceWithMemberEntity, GuestAttendanceEntity};
use crate::metrics::QueryTimer;

const ATTENDANCE_COLUMNS: &str = "id, member_id, event_id, method, checked_in_at";

/// Repository for attendance records.
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the attendance row for a (member, event) pair.
    pub async fn find_by_member_event(
        &self,
        member_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<AttendanceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_attendance_by_member_event");
        let result = sqlx::query_as::<_, AttendanceEntity>(&format!(
            "SELECT {} FROM attendance WHERE member_id = $1 AND event_id = $2",
            ATTENDANCE_COLUMNS
        ))
        .bind(member_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert an attendance row.
    ///
    /// A concurrent duplicate surfaces as a unique violation from the
    /// storage layer; callers map it to the "already checked in" error.
    pub async fn insert(
        &self,
        member_id: Uuid,
        event_id: Uuid,
        method: &str,
        checked_in_at: DateTime<Utc>,
    ) -> Result<AttendanceEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_attendance");
        let result = sqlx::query_as::<_, AttendanceEntity>(&format!(
            r#"
            INSERT INTO attendance (member_id, event_id, method, checked_in_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ATTENDANCE_COLUMNS
        ))
        .bind(member_id)
        .bind(event_id)
        .bind(method)
        .bind(checked_in_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attendance for an event with member identity, newest first.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<AttendanceWithMemberEntity>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceWithMemberEntity>(
            r#"
            SELECT a.id, a.member_id, a.event_id, a.method, a.checked_in_at,
                   m.full_name, m.fellowship_number
            FROM attendance a
            JOIN members m ON m.id = a.member_id
            WHERE a.event_id = $1
            ORDER BY a.checked_in_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Count check-ins for an event.
    pub async fn count_for_event(&self, event_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM attendance WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }
}

/// Repository for guest attendance records. Guests have no dedup key.
#[derive(Clone)]
pub struct GuestAttendanceRepository {
    pool: PgPool,
}

impl GuestAttendanceRepository {
    /// Creates a new GuestAttendanceRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a guest check-in row.
    pub async fn insert(
        &self,
        event_id: Uuid,
        guest_name: &str,
        guest_phone: Option<&str>,
        purpose: Option<&str>,
        checked_in_at: DateTime<Utc>,
    ) -> Result<GuestAttendanceEntity, sqlx::Error> {
        sqlx::query_as::<_, GuestAttendanceEntity>(
            r#"
            INSERT INTO guest_attendance (event_id, guest_name, guest_phone, purpose, checked_in_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, guest_name, guest_phone, purpose, checked_in_at
            "#,
        )
        .bind(event_id)
        .bind(guest_name)
        .bind(guest_phone)
        .bind(purpose)
        .bind(checked_in_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Guest check-ins for an event, newest first.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<GuestAttendanceEntity>, sqlx::Error> {
        sqlx::query_as::<_, GuestAttendanceEntity>(
            r#"
            SELECT id, event_id, guest_name, guest_phone, purpose, checked_in_at
            FROM guest_attendance
            WHERE event_id = $1
            ORDER BY checked_in_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }
}
