use askama::Template;

use super::{PageContext, SlipView};
use crate::models::member::MemberWithRoles;
use crate::models::role::RoleWithCount;

/// One role cell in the member table.
#[derive(Debug, Clone)]
pub struct RoleToggle {
    pub role_name: String,
    pub display_name: String,
    pub held: bool,
}

#[derive(Debug, Clone)]
pub struct MemberRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub form_class: String,
    pub roles: Vec<RoleToggle>,
    pub is_self: bool,
}

impl MemberRow {
    pub fn build(m: &MemberWithRoles, all_roles: &[RoleWithCount], viewer_id: i64) -> Self {
        Self {
            id: m.member.id,
            email: m.member.email.clone(),
            full_name: m.member.full_name.clone(),
            form_class: m.member.form_class_or_dash().to_string(),
            roles: all_roles
                .iter()
                .map(|r| RoleToggle {
                    role_name: r.role_name.clone(),
                    display_name: r.display_name.clone(),
                    held: m.has_role(&r.role_name),
                })
                .collect(),
            is_self: m.member.id == viewer_id,
        }
    }
}

#[derive(Template)]
#[template(path = "members/list.html")]
pub struct MemberListTemplate {
    pub ctx: PageContext,
    pub members: Vec<MemberRow>,
    pub roles: Vec<RoleWithCount>,
}

/// A student inside a supervisor's form.
#[derive(Debug, Clone)]
pub struct StudentRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub form_class: String,
    pub is_beadle: bool,
}

#[derive(Template)]
#[template(path = "supervisor.html")]
pub struct SupervisorTemplate {
    pub ctx: PageContext,
    pub scope_name: String,
    pub today: String,
    pub students: Vec<StudentRow>,
    pub slips: Vec<SlipView>,
}
