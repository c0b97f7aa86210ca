//! Member onboarding: manager-driven creation and the self-registration
//! approval workflow.
//!
//! Approval is all-or-nothing against the store: the member row, its
//! pending-first-attendance marker, any requested registration tags and
//! the review stamp commit together or not at all. The welcome email is
//! explicitly outside that scope - queued fire-and-forget after commit so
//! a slow mail provider cannot block or roll back the approval.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::academic::AcademicService;
use crate::services::email::EmailService;
use domain::models::member::{CreateMemberRequest, Gender, Member};
use domain::models::registration::RegistrationStatus;
use domain::models::tag::system_tags;
use persistence::entities::MemberEntity;
use persistence::repositories::{MemberRepository, RegistrationRepository, TagRepository};
use shared::crypto::generate_qr_token;
use shared::password::hash_password;
use shared::validation::format_fellowship_number;

/// Service onboarding new members.
#[derive(Clone)]
pub struct OnboardingService {
    pool: PgPool,
    members: MemberRepository,
    registrations: RegistrationRepository,
    tags: TagRepository,
    academic: AcademicService,
    email: EmailService,
    number_prefix: String,
}

impl OnboardingService {
    pub fn new(
        pool: PgPool,
        academic: AcademicService,
        email: EmailService,
        number_prefix: String,
    ) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            pool,
            academic,
            email,
            number_prefix,
        }
    }

    /// Allocate the next fellowship number under the configured prefix.
    async fn allocate_fellowship_number(&self) -> Result<String, ApiError> {
        let sequence = self
            .members
            .max_fellowship_sequence(&self.number_prefix)
            .await?
            + 1;
        if sequence > 999 {
            return Err(ApiError::Internal(format!(
                "Fellowship number space exhausted for prefix {}",
                self.number_prefix
            )));
        }
        Ok(format_fellowship_number(&self.number_prefix, sequence as u32))
    }

    /// Insert the member row plus its initial tags inside the caller's
    /// transaction.
    async fn insert_member_with_tags(
        &self,
        tx: &mut PgConnection,
        request: &CreateMemberRequest,
        fellowship_number: &str,
        extra_tag_ids: &[Uuid],
        actor: Option<Uuid>,
    ) -> Result<MemberEntity, ApiError> {
        let password_hash = hash_password(fellowship_number)?;
        let qr_code = generate_qr_token();
        let registered_on = request
            .registered_on
            .unwrap_or_else(|| Utc::now().date_naive());

        let member = sqlx::query_as::<_, MemberEntity>(
            r#"
            INSERT INTO members (full_name, email, phone, gender, fellowship_number, qr_code,
                                 role, password_hash, registered_on, initial_year,
                                 initial_semester, course_id, region_id, residence)
            VALUES ($1, $2, $3, $4, $5, $6, 'member', $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, full_name, email, phone, gender, fellowship_number, qr_code, role,
                      password_hash, registered_on, initial_year, initial_semester, course_id,
                      region_id, residence, is_active, failed_login_attempts, locked_until,
                      created_at, updated_at
            "#,
        )
        .bind(&request.full_name)
        .bind(&request.email)
        .bind(request.phone.as_deref())
        .bind(request.gender.to_string())
        .bind(fellowship_number)
        .bind(&qr_code)
        .bind(&password_hash)
        .bind(registered_on)
        .bind(request.initial_year)
        .bind(request.initial_semester)
        .bind(request.course_id)
        .bind(request.region_id)
        .bind(request.residence.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        // Marks "has never attended"; cleared by the first real check-in,
        // not by registration.
        let pending_tag = self
            .tags
            .find_by_name(system_tags::PENDING_FIRST_ATTENDANCE)
            .await?;
        if let Some(pending_tag) = &pending_tag {
            sqlx::query(
                "INSERT INTO member_tags (member_id, tag_id, assigned_by) VALUES ($1, $2, NULL)",
            )
            .bind(member.id)
            .bind(pending_tag.id)
            .execute(&mut *tx)
            .await?;
        }

        // Tags the applicant ticked on the form; only registration-visible
        // ones are honored.
        for tag_id in extra_tag_ids {
            let visible: Option<(bool,)> =
                sqlx::query_as("SELECT show_on_registration FROM tags WHERE id = $1")
                    .bind(tag_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if matches!(visible, Some((true,))) {
                sqlx::query(
                    "INSERT INTO member_tags (member_id, tag_id, assigned_by) VALUES ($1, $2, $3)",
                )
                .bind(member.id)
                .bind(tag_id)
                .bind(actor)
                .execute(&mut *tx)
                .await?;
            }
        }

        Ok(member)
    }

    /// Create a member directly (manager-driven registration).
    ///
    /// The fellowship number is generated here and doubles as the
    /// initial password. Academic tags are reconciled after commit;
    /// reconciliation is idempotent, so a crash in between self-corrects
    /// on the next run.
    pub async fn create_member(
        &self,
        request: &CreateMemberRequest,
        extra_tag_ids: &[Uuid],
        actor: Option<Uuid>,
    ) -> Result<Member, ApiError> {
        if self.members.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict(
                "A member with this email already exists".to_string(),
            ));
        }

        let fellowship_number = self.allocate_fellowship_number().await?;

        let mut tx = self.pool.begin().await?;
        let member = self
            .insert_member_with_tags(&mut tx, request, &fellowship_number, extra_tag_ids, actor)
            .await?;
        tx.commit().await?;

        self.academic
            .reconcile_member_tags(member.id, actor)
            .await?;

        info!(
            member_id = %member.id,
            fellowship_number = %fellowship_number,
            "Member created"
        );
        Ok(member.into())
    }

    /// Approve a pending self-registration: member creation and the
    /// review stamp commit in one transaction, then the welcome email is
    /// queued.
    pub async fn approve_registration(
        &self,
        registration_id: Uuid,
        reviewer: Uuid,
    ) -> Result<Member, ApiError> {
        let registration = self
            .registrations
            .find_by_id(registration_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

        if registration.status != RegistrationStatus::Pending.as_str() {
            return Err(ApiError::Conflict(
                "Registration has already been reviewed".to_string(),
            ));
        }

        if self
            .members
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "A member with this email already exists".to_string(),
            ));
        }

        let request = CreateMemberRequest {
            full_name: registration.full_name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            gender: registration.gender.parse().unwrap_or(Gender::Male),
            registered_on: registration.registered_on,
            initial_year: registration.initial_year,
            initial_semester: registration.initial_semester,
            course_id: registration.course_id,
            region_id: registration.region_id,
            residence: registration.residence.clone(),
        };

        let fellowship_number = self.allocate_fellowship_number().await?;

        let mut tx = self.pool.begin().await?;

        let member = self
            .insert_member_with_tags(
                &mut tx,
                &request,
                &fellowship_number,
                &registration.requested_tag_ids,
                Some(reviewer),
            )
            .await?;

        // Guarded by status so two racing approvals cannot both commit.
        let reviewed = sqlx::query(
            r#"
            UPDATE pending_registrations
            SET status = 'APPROVED', reviewed_by = $2, reviewed_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(registration_id)
        .bind(reviewer)
        .execute(&mut *tx)
        .await?;

        if reviewed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(ApiError::Conflict(
                "Registration was reviewed concurrently".to_string(),
            ));
        }

        tx.commit().await?;

        self.academic
            .reconcile_member_tags(member.id, Some(reviewer))
            .await?;

        // Fire-and-forget: approval never waits on the mail provider.
        let email = self.email.clone();
        let to = member.email.clone();
        let name = member.full_name.clone();
        let number = member.fellowship_number.clone();
        tokio::spawn(async move {
            if let Err(err) = email.send_welcome_email(&to, &name, &number).await {
                error!(to = %to, error = %err, "Welcome email failed");
            }
        });

        info!(registration_id = %registration_id, member_id = %member.id, "Registration approved");
        Ok(member.into())
    }

    /// Reject a pending self-registration.
    pub async fn reject_registration(
        &self,
        registration_id: Uuid,
        reviewer: Uuid,
    ) -> Result<(), ApiError> {
        let affected = self
            .registrations
            .mark_reviewed(
                registration_id,
                RegistrationStatus::Rejected.as_str(),
                reviewer,
            )
            .await?;

        if affected == 0 {
            let exists = self
                .registrations
                .find_by_id(registration_id)
                .await?
                .is_some();
            return Err(if exists {
                ApiError::Conflict("Registration has already been reviewed".to_string())
            } else {
                ApiError::NotFound("Registration not found".to_string())
            });
        }

        info!(registration_id = %registration_id, "Registration rejected");
        Ok(())
    }
}
