//! Pending registration repository for database operations.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PendingRegistrationEntity;

const REGISTRATION_COLUMNS: &str = "id, full_name, email, phone, gender, registered_on, \
     initial_year, initial_semester, course_id, region_id, residence, requested_tag_ids, \
     status, submitted_at, reviewed_by, reviewed_at";

/// Insert payload for a self-registration submission.
#[derive(Debug, Clone)]
pub struct NewRegistration<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub gender: &'a str,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<&'a str>,
    pub requested_tag_ids: &'a [Uuid],
}

/// Repository for self-registration submissions.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Creates a new RegistrationRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a submission by id.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PendingRegistrationEntity>, sqlx::Error> {
        sqlx::query_as::<_, PendingRegistrationEntity>(&format!(
            "SELECT {} FROM pending_registrations WHERE id = $1",
            REGISTRATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert a new submission with PENDING status.
    pub async fn insert(
        &self,
        registration: NewRegistration<'_>,
    ) -> Result<PendingRegistrationEntity, sqlx::Error> {
        sqlx::query_as::<_, PendingRegistrationEntity>(&format!(
            r#"
            INSERT INTO pending_registrations
                (full_name, email, phone, gender, registered_on, initial_year,
                 initial_semester, course_id, region_id, residence, requested_tag_ids)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        ))
        .bind(registration.full_name)
        .bind(registration.email)
        .bind(registration.phone)
        .bind(registration.gender)
        .bind(registration.registered_on)
        .bind(registration.initial_year)
        .bind(registration.initial_semester)
        .bind(registration.course_id)
        .bind(registration.region_id)
        .bind(registration.residence)
        .bind(registration.requested_tag_ids)
        .fetch_one(&self.pool)
        .await
    }

    /// List submissions, optionally filtered by status, newest first.
    pub async fn list(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<PendingRegistrationEntity>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, PendingRegistrationEntity>(&format!(
                    r#"
                    SELECT {} FROM pending_registrations
                    WHERE status = $1
                    ORDER BY submitted_at DESC
                    "#,
                    REGISTRATION_COLUMNS
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, PendingRegistrationEntity>(&format!(
                    "SELECT {} FROM pending_registrations ORDER BY submitted_at DESC",
                    REGISTRATION_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Move a PENDING submission to a reviewed status. Returns rows
    /// affected; 0 means the submission was absent or already reviewed.
    pub async fn mark_reviewed(
        &self,
        id: Uuid,
        status: &str,
        reviewed_by: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE pending_registrations
            SET status = $2, reviewed_by = $3, reviewed_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
