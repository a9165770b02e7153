use serde::Deserialize;
use sqlx::FromRow;

use crate::models::role::RoleRow;

/// Internal member struct for authentication, including the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub form_class: Option<String>,
    pub password_hash: String,
    pub created_at: String,
}

/// Safe version for templates and scope filtering, without the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct MemberSummary {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub form_class: Option<String>,
    pub created_at: String,
}

impl MemberSummary {
    pub fn form_class_or_dash(&self) -> &str {
        self.form_class.as_deref().unwrap_or("-")
    }
}

/// Member with all assigned roles, for the admin list.
#[derive(Debug, Clone)]
pub struct MemberWithRoles {
    pub member: MemberSummary,
    pub roles: Vec<RoleRow>,
}

impl MemberWithRoles {
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|r| r.role_name == role_name)
    }
}

/// New member data for creation.
pub struct NewMember {
    pub email: String,
    pub full_name: String,
    pub form_class: Option<String>,
    pub password_hash: String,
}

/// Form data from the signup page.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub form_class: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

/// Form data from the account page.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub full_name: String,
    #[serde(default)]
    pub form_class: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub csrf_token: String,
}

/// Empty input means "no form class".
pub fn normalize_form_class(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
