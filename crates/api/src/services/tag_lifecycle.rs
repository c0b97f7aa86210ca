//! Tag lifecycle management.
//!
//! Enforces the MemberTag consistency rules over the repositories:
//! idempotent assignment, stamped removal, lazy expiry healing, and
//! execution of academic reconciliation plans. The "at most one active
//! row per (member, tag)" rule is a read-then-write check; two racing
//! assignments can still both insert, which is an accepted race under
//! admin-driven usage.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use domain::models::member_tag::MemberTag;
use domain::models::tag::system_tags;
use domain::services::tag_policy::{AcademicTagPlan, AcademicTagState};
use persistence::entities::TagEntity;
use persistence::repositories::{MemberTagRepository, TagRepository};
use shared::clock::SharedClock;

/// Service enforcing tag assignment semantics.
#[derive(Clone)]
pub struct TagLifecycleService {
    tags: TagRepository,
    member_tags: MemberTagRepository,
    clock: SharedClock,
}

impl TagLifecycleService {
    /// Creates a new TagLifecycleService over the given pool.
    pub fn new(pool: PgPool, clock: SharedClock) -> Self {
        Self {
            tags: TagRepository::new(pool.clone()),
            member_tags: MemberTagRepository::new(pool),
            clock,
        }
    }

    /// Resolve a tag by name, or 404.
    async fn tag_by_name(&self, tag_name: &str) -> Result<TagEntity, ApiError> {
        self.tags
            .find_by_name(tag_name)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Tag {} not found", tag_name)))
    }

    /// True if the member holds a live (active, non-expired) assignment
    /// of the named tag.
    ///
    /// Healing read: an active-but-expired row found here is deactivated
    /// before returning false. A missing tag is not an error; it reads
    /// as "no assignment".
    pub async fn has_active_tag(
        &self,
        member_id: Uuid,
        tag_name: &str,
    ) -> Result<bool, ApiError> {
        let Some(tag) = self.tags.find_by_name(tag_name).await? else {
            return Ok(false);
        };

        let Some(row) = self.member_tags.find_active(member_id, tag.id).await? else {
            return Ok(false);
        };

        let now = self.clock.now();
        if row.expires_at.map(|at| at <= now).unwrap_or(false) {
            self.member_tags
                .deactivate(row.id, None, Some("expired"))
                .await?;
            debug!(member_id = %member_id, tag = %tag_name, "Healed expired tag on read");
            return Ok(false);
        }

        Ok(true)
    }

    /// Assign a tag by name. Idempotent: a live existing assignment is
    /// returned as-is; an expired-but-active one is first cleaned up and
    /// replaced with a fresh row.
    pub async fn assign_role_tag(
        &self,
        member_id: Uuid,
        tag_name: &str,
        actor: Option<Uuid>,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
        notes: Option<&str>,
    ) -> Result<MemberTag, ApiError> {
        let tag = self.tag_by_name(tag_name).await?;
        self.assign_tag(member_id, &tag, actor, expires_at, notes).await
    }

    /// Assign a tag by id (manager-driven custom tag assignment).
    pub async fn assign_tag_id(
        &self,
        member_id: Uuid,
        tag_id: Uuid,
        actor: Option<Uuid>,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
        notes: Option<&str>,
    ) -> Result<MemberTag, ApiError> {
        let tag = self
            .tags
            .find_by_id(tag_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;
        self.assign_tag(member_id, &tag, actor, expires_at, notes).await
    }

    async fn assign_tag(
        &self,
        member_id: Uuid,
        tag: &TagEntity,
        actor: Option<Uuid>,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
        notes: Option<&str>,
    ) -> Result<MemberTag, ApiError> {
        if let Some(existing) = self.member_tags.find_active(member_id, tag.id).await? {
            let now = self.clock.now();
            let expired = existing.expires_at.map(|at| at <= now).unwrap_or(false);
            if !expired {
                // Already assigned and live: no-op.
                return Ok(existing.into());
            }
            self.member_tags
                .deactivate(existing.id, None, Some("expired cleanup"))
                .await?;
        }

        let row = self
            .member_tags
            .insert(member_id, tag.id, actor, expires_at, notes)
            .await?;
        info!(member_id = %member_id, tag = %tag.name, "Tag assigned");
        Ok(row.into())
    }

    /// Deactivate the active assignment of a named tag, if present.
    /// Returns true when a row was deactivated.
    pub async fn remove_role_tag(
        &self,
        member_id: Uuid,
        tag_name: &str,
        actor: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let Some(tag) = self.tags.find_by_name(tag_name).await? else {
            return Ok(false);
        };
        let affected = self
            .member_tags
            .deactivate_active(member_id, tag.id, actor, None)
            .await?;
        Ok(affected > 0)
    }

    /// Deactivate the active assignment of a tag by id.
    pub async fn remove_tag_id(
        &self,
        member_id: Uuid,
        tag_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<bool, ApiError> {
        let affected = self
            .member_tags
            .deactivate_active(member_id, tag_id, actor, None)
            .await?;
        Ok(affected > 0)
    }

    /// Current active FINALIST/ALUMNI state for a member, as planner
    /// input. Academic tags carry no expiry, so this is a plain active
    /// check.
    pub async fn academic_state(&self, member_id: Uuid) -> Result<AcademicTagState, ApiError> {
        let finalist = self.tag_by_name(system_tags::FINALIST).await?;
        let alumni = self.tag_by_name(system_tags::ALUMNI).await?;

        Ok(AcademicTagState {
            has_active_finalist: self
                .member_tags
                .find_active(member_id, finalist.id)
                .await?
                .is_some(),
            has_active_alumni: self
                .member_tags
                .find_active(member_id, alumni.id)
                .await?
                .is_some(),
        })
    }

    /// Execute an academic reconciliation plan: deactivations first, then
    /// the ensure, so a supersession never leaves both tags active.
    pub async fn apply_academic_plan(
        &self,
        member_id: Uuid,
        plan: &AcademicTagPlan,
        actor: Option<Uuid>,
    ) -> Result<(), ApiError> {
        if plan.is_noop() {
            return Ok(());
        }

        for deactivation in &plan.deactivate {
            let tag = self.tag_by_name(deactivation.tag_name).await?;
            self.member_tags
                .deactivate_active(member_id, tag.id, actor, Some(deactivation.reason))
                .await?;
        }

        if let Some(tag_name) = plan.ensure_active {
            let tag = self.tag_by_name(tag_name).await?;
            if self
                .member_tags
                .find_active(member_id, tag.id)
                .await?
                .is_none()
            {
                self.member_tags
                    .insert(member_id, tag.id, actor, None, None)
                    .await?;
            }
        }

        info!(member_id = %member_id, "Academic tags reconciled");
        Ok(())
    }
}
