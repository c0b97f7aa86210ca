//! Member repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MemberEntity, MemberRosterEntity};
use crate::metrics::QueryTimer;

/// Insert payload for a new member row.
#[derive(Debug, Clone)]
pub struct NewMember<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub gender: &'a str,
    pub fellowship_number: &'a str,
    pub qr_code: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<&'a str>,
}

/// Profile fields a member update may touch; `None` leaves the column
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemberProfilePatch<'a> {
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<&'a str>,
}

/// Repository for member-related database operations.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

const MEMBER_COLUMNS: &str = "id, full_name, email, phone, gender, fellowship_number, qr_code, \
     role, password_hash, registered_on, initial_year, initial_semester, course_id, region_id, \
     residence, is_active, failed_login_attempts, locked_until, created_at, updated_at";

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a member by id (including soft-deleted rows; callers decide).
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MemberEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE id = $1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a member by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<MemberEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE lower(email) = lower($1)",
            MEMBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a member by fellowship number.
    pub async fn find_by_fellowship_number(
        &self,
        fellowship_number: &str,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_fellowship_number");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE fellowship_number = $1",
            MEMBER_COLUMNS
        ))
        .bind(fellowship_number)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a member by QR token.
    pub async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_qr_code");
        let result = sqlx::query_as::<_, MemberEntity>(&format!(
            "SELECT {} FROM members WHERE qr_code = $1",
            MEMBER_COLUMNS
        ))
        .bind(qr_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a new member row.
    pub async fn create(&self, member: NewMember<'_>) -> Result<MemberEntity, sqlx::Error> {
        sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            INSERT INTO members (full_name, email, phone, gender, fellowship_number, qr_code,
                                 role, password_hash, registered_on, initial_year,
                                 initial_semester, course_id, region_id, residence)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(member.full_name)
        .bind(member.email)
        .bind(member.phone)
        .bind(member.gender)
        .bind(member.fellowship_number)
        .bind(member.qr_code)
        .bind(member.role)
        .bind(member.password_hash)
        .bind(member.registered_on)
        .bind(member.initial_year)
        .bind(member.initial_semester)
        .bind(member.course_id)
        .bind(member.region_id)
        .bind(member.residence)
        .fetch_one(&self.pool)
        .await
    }

    /// Apply a profile patch; absent fields keep their current value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        patch: MemberProfilePatch<'_>,
    ) -> Result<Option<MemberEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberEntity>(&format!(
            r#"
            UPDATE members SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                gender = COALESCE($5, gender),
                registered_on = COALESCE($6, registered_on),
                initial_year = COALESCE($7, initial_year),
                initial_semester = COALESCE($8, initial_semester),
                course_id = COALESCE($9, course_id),
                region_id = COALESCE($10, region_id),
                residence = COALESCE($11, residence),
                updated_at = NOW()
            WHERE id = $1 AND is_active = true
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(id)
        .bind(patch.full_name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.gender)
        .bind(patch.registered_on)
        .bind(patch.initial_year)
        .bind(patch.initial_semester)
        .bind(patch.course_id)
        .bind(patch.region_id)
        .bind(patch.residence)
        .fetch_optional(&self.pool)
        .await
    }

    /// Soft-delete a member. Returns the number of rows affected.
    pub async fn soft_delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE members SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List active members after an optional (created_at, id) cursor.
    pub async fn list_active(
        &self,
        after: Option<(DateTime<Utc>, Uuid)>,
        limit: i64,
    ) -> Result<Vec<MemberEntity>, sqlx::Error> {
        match after {
            Some((created_at, id)) => {
                sqlx::query_as::<_, MemberEntity>(&format!(
                    r#"
                    SELECT {} FROM members
                    WHERE is_active = true AND (created_at, id) > ($1, $2)
                    ORDER BY created_at ASC, id ASC
                    LIMIT $3
                    "#,
                    MEMBER_COLUMNS
                ))
                .bind(created_at)
                .bind(id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MemberEntity>(&format!(
                    r#"
                    SELECT {} FROM members
                    WHERE is_active = true
                    ORDER BY created_at ASC, id ASC
                    LIMIT $1
                    "#,
                    MEMBER_COLUMNS
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Count active members.
    pub async fn count_active(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members WHERE is_active = true")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Highest fellowship-number sequence already issued for a prefix.
    pub async fn max_fellowship_sequence(&self, prefix: &str) -> Result<i32, sqlx::Error> {
        let max: (Option<i32>,) = sqlx::query_as(
            r#"
            SELECT MAX(substring(fellowship_number from 4)::int)
            FROM members
            WHERE fellowship_number LIKE $1 || '%'
            "#,
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;
        Ok(max.0.unwrap_or(0))
    }

    /// Lightweight active-member roster for offline client caching.
    pub async fn offline_roster(&self) -> Result<Vec<MemberRosterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("offline_roster");
        let result = sqlx::query_as::<_, MemberRosterEntity>(
            r#"
            SELECT id, full_name, fellowship_number, phone, qr_code, region_id
            FROM members
            WHERE is_active = true
            ORDER BY full_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Record a failed login attempt, optionally opening a lockout window.
    pub async fn record_login_failure(
        &self,
        id: Uuid,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET failed_login_attempts = failed_login_attempts + 1,
                locked_until = COALESCE($2, locked_until),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(locked_until)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Clear the failed-login counter and lockout after a successful login.
    pub async fn clear_login_failures(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET failed_login_attempts = 0, locked_until = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
