use actix_session::Session;
use sqlx::SqlitePool;

use super::session::require_member_id;
use crate::errors::AppError;
use crate::models::member::{self, MemberSummary};
use crate::models::role::{self, RoleSet, SupervisorScope};

/// The logged-in member and their roles, loaded fresh for each request so
/// role changes apply without logging out.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub member: MemberSummary,
    pub roles: RoleSet,
}

impl Viewer {
    pub async fn load(session: &Session, pool: &SqlitePool) -> Result<Self, AppError> {
        let member_id = require_member_id(session)?;
        let Some(member) = member::find_summary_by_id(pool, member_id).await? else {
            // Member deleted while logged in.
            session.purge();
            return Err(AppError::Session(format!("Member {member_id} no longer exists")));
        };
        let roles = RoleSet::from_rows(&role::find_for_member(pool, member_id).await?);
        Ok(Self { member, roles })
    }

    pub fn id(&self) -> i64 {
        self.member.id
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.roles.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied("administrators only".to_string()))
        }
    }

    pub fn require_beadle(&self) -> Result<(), AppError> {
        if self.roles.is_beadle() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied("beadles only".to_string()))
        }
    }

    /// The supervised form; unscoped or conflicting roles deny access.
    pub fn supervisor_scope(&self) -> Result<SupervisorScope, AppError> {
        Ok(self.roles.supervisor_scope()?)
    }
}
