use std::collections::HashMap;

use sqlx::SqlitePool;

use super::types::{Member, MemberSummary, MemberWithRoles, NewMember};
use crate::models::role::RoleRow;

const SELECT_SUMMARY: &str =
    "SELECT id, email, full_name, form_class, created_at FROM members";

pub async fn create(pool: &SqlitePool, new: &NewMember) -> Result<i64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO members (email, full_name, form_class, password_hash) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&new.email)
    .bind(&new.full_name)
    .bind(&new.form_class)
    .bind(&new.password_hash)
    .execute(pool)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Find member by email for authentication. Returns the password hash too.
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Member>, sqlx::Error> {
    sqlx::query_as::<_, Member>(
        "SELECT id, email, full_name, form_class, password_hash, created_at \
         FROM members WHERE email = ?1",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub async fn find_summary_by_id(pool: &SqlitePool, id: i64) -> Result<Option<MemberSummary>, sqlx::Error> {
    let sql = format!("{SELECT_SUMMARY} WHERE id = ?1");
    sqlx::query_as::<_, MemberSummary>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<MemberSummary>, sqlx::Error> {
    let sql = format!("{SELECT_SUMMARY} ORDER BY form_class IS NULL, form_class, full_name, id");
    sqlx::query_as::<_, MemberSummary>(&sql).fetch_all(pool).await
}

/// Members with a form class set; candidates for supervisor scope filtering.
pub async fn find_with_form_class(pool: &SqlitePool) -> Result<Vec<MemberSummary>, sqlx::Error> {
    let sql = format!(
        "{SELECT_SUMMARY} WHERE form_class IS NOT NULL AND form_class <> '' \
         ORDER BY form_class, full_name, id"
    );
    sqlx::query_as::<_, MemberSummary>(&sql).fetch_all(pool).await
}

/// All members with their roles (two queries, joined in memory).
pub async fn find_all_with_roles(pool: &SqlitePool) -> Result<Vec<MemberWithRoles>, sqlx::Error> {
    let members = find_all(pool).await?;

    let rows: Vec<(i64, i64, String, String)> = sqlx::query_as(
        "SELECT mr.member_id, r.id, r.role_name, r.display_name \
         FROM member_roles mr JOIN roles r ON r.id = mr.role_id \
         ORDER BY mr.member_id, mr.id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_member: HashMap<i64, Vec<RoleRow>> = HashMap::new();
    for (member_id, id, role_name, display_name) in rows {
        by_member
            .entry(member_id)
            .or_default()
            .push(RoleRow { id, role_name, display_name });
    }

    Ok(members
        .into_iter()
        .map(|m| {
            let roles = by_member.remove(&m.id).unwrap_or_default();
            MemberWithRoles { member: m, roles }
        })
        .collect())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM members").fetch_one(pool).await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    full_name: &str,
    form_class: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE members SET full_name = ?1, form_class = ?2 WHERE id = ?3")
        .bind(full_name)
        .bind(form_class)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE members SET password_hash = ?1 WHERE id = ?2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a member. Role assignments go with it.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM members WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}
