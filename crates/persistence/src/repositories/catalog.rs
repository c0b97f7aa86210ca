//! Repositories for reference data: courses, regions, academic periods.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AcademicPeriodEntity, CourseEntity, RegionEntity};

/// Repository for courses of study.
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CourseEntity>, sqlx::Error> {
        sqlx::query_as::<_, CourseEntity>(
            "SELECT id, name, duration_years, created_at, updated_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, name: &str, duration_years: i32) -> Result<CourseEntity, sqlx::Error> {
        sqlx::query_as::<_, CourseEntity>(
            r#"
            INSERT INTO courses (name, duration_years)
            VALUES ($1, $2)
            RETURNING id, name, duration_years, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(duration_years)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list(&self) -> Result<Vec<CourseEntity>, sqlx::Error> {
        sqlx::query_as::<_, CourseEntity>(
            "SELECT id, name, duration_years, created_at, updated_at FROM courses ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Repository for member regions.
#[derive(Clone)]
pub struct RegionRepository {
    pool: PgPool,
}

impl RegionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RegionEntity>, sqlx::Error> {
        sqlx::query_as::<_, RegionEntity>(
            "SELECT id, name, created_at FROM regions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, name: &str) -> Result<RegionEntity, sqlx::Error> {
        sqlx::query_as::<_, RegionEntity>(
            "INSERT INTO regions (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list(&self) -> Result<Vec<RegionEntity>, sqlx::Error> {
        sqlx::query_as::<_, RegionEntity>(
            "SELECT id, name, created_at FROM regions ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Repository for configured academic periods.
#[derive(Clone)]
pub struct AcademicPeriodRepository {
    pool: PgPool,
}

impl AcademicPeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All periods in chronological order, as the progression calculator
    /// expects them.
    pub async fn list_ordered(&self) -> Result<Vec<AcademicPeriodEntity>, sqlx::Error> {
        sqlx::query_as::<_, AcademicPeriodEntity>(
            r#"
            SELECT id, name, starts_on, ends_on, created_at
            FROM academic_periods
            ORDER BY starts_on ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        name: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> Result<AcademicPeriodEntity, sqlx::Error> {
        sqlx::query_as::<_, AcademicPeriodEntity>(
            r#"
            INSERT INTO academic_periods (name, starts_on, ends_on)
            VALUES ($1, $2, $3)
            RETURNING id, name, starts_on, ends_on, created_at
            "#,
        )
        .bind(name)
        .bind(starts_on)
        .bind(ends_on)
        .fetch_one(&self.pool)
        .await
    }
}
