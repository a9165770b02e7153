// Template context structures for Askama templates, organized by domain.

use actix_session::Session;

use crate::auth::Viewer;
use crate::auth::csrf;
use crate::auth::session::take_flash;
use crate::config::AppConfig;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.full_name`, `ctx.is_admin`, etc.
pub struct PageContext {
    pub full_name: String,
    pub email: String,
    pub avatar_initial: String,
    pub role_names: String,
    pub is_admin: bool,
    pub is_beadle: bool,
    pub is_supervisor: bool,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, viewer: &Viewer, config: &AppConfig, current_path: &str) -> Self {
        let name = if viewer.member.full_name.trim().is_empty() {
            viewer.member.email.clone()
        } else {
            viewer.member.full_name.clone()
        };
        let avatar_initial = name.chars().next().unwrap_or('?').to_uppercase().to_string();
        Self {
            full_name: name,
            email: viewer.member.email.clone(),
            avatar_initial,
            role_names: viewer.roles.join(", "),
            is_admin: viewer.roles.is_admin(),
            is_beadle: viewer.roles.is_beadle(),
            is_supervisor: viewer.roles.is_supervisor(),
            flash: take_flash(session),
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        }
    }

    /// True when the nav link for `path` should be highlighted.
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

mod common;
mod dashboard;
mod member;
mod report;
mod slip;

pub use common::*;
pub use dashboard::*;
pub use member::*;
pub use report::*;
pub use slip::*;
