use serde::Serialize;
use sqlx::FromRow;

pub const ADMIN: &str = "admin";
pub const BEADLE: &str = "beadle";
pub const TECH_TEAM: &str = "tech_team";

/// Role definitions seeded at startup: (role_name, display_name).
pub const SEED_ROLES: &[(&str, &str)] = &[
    (BEADLE, "Beadle"),
    (ADMIN, "Administrator"),
    (TECH_TEAM, "Tech Team"),
    ("supervisor_1", "Supervisor (1st Form)"),
    ("supervisor_2", "Supervisor (2nd Form)"),
    ("supervisor_3", "Supervisor (3rd Form)"),
    ("supervisor_4", "Supervisor (4th Form)"),
    ("supervisor_5", "Supervisor (5th Form)"),
    ("supervisor_6", "Supervisor (Sixth Form)"),
    ("supervisor_6a", "Supervisor (6A)"),
    ("supervisor_6b", "Supervisor (6B)"),
];

/// One row of the roles table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RoleRow {
    pub id: i64,
    pub role_name: String,
    pub display_name: String,
}

/// Role with the number of members holding it, for the admin page.
#[derive(Debug, Clone, FromRow)]
pub struct RoleWithCount {
    pub id: i64,
    pub role_name: String,
    pub display_name: String,
    pub member_count: i64,
}
