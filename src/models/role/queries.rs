use sqlx::SqlitePool;

use super::types::{RoleRow, RoleWithCount, SEED_ROLES};

/// Insert the canonical role rows. Existing rows are left untouched.
pub async fn seed(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for &(name, label) in SEED_ROLES {
        sqlx::query("INSERT OR IGNORE INTO roles (role_name, display_name) VALUES (?1, ?2)")
            .bind(name)
            .bind(label)
            .execute(pool)
            .await?;
    }
    Ok(())
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<RoleRow>, sqlx::Error> {
    sqlx::query_as::<_, RoleRow>("SELECT id, role_name, display_name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await
}

/// All roles with member counts.
pub async fn find_all_with_counts(pool: &SqlitePool) -> Result<Vec<RoleWithCount>, sqlx::Error> {
    sqlx::query_as::<_, RoleWithCount>(
        "SELECT r.id, r.role_name, r.display_name, \
                (SELECT COUNT(*) FROM member_roles mr WHERE mr.role_id = r.id) AS member_count \
         FROM roles r ORDER BY r.id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_name(pool: &SqlitePool, role_name: &str) -> Result<Option<RoleRow>, sqlx::Error> {
    sqlx::query_as::<_, RoleRow>(
        "SELECT id, role_name, display_name FROM roles WHERE role_name = ?1",
    )
    .bind(role_name)
    .fetch_optional(pool)
    .await
}

/// Roles held by a member, in assignment order.
pub async fn find_for_member(pool: &SqlitePool, member_id: i64) -> Result<Vec<RoleRow>, sqlx::Error> {
    sqlx::query_as::<_, RoleRow>(
        "SELECT r.id, r.role_name, r.display_name \
         FROM member_roles mr \
         JOIN roles r ON r.id = mr.role_id \
         WHERE mr.member_id = ?1 \
         ORDER BY mr.id",
    )
    .bind(member_id)
    .fetch_all(pool)
    .await
}

/// Grant a role. Returns true when a new assignment was created.
pub async fn assign(pool: &SqlitePool, member_id: i64, role_id: i64) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("INSERT OR IGNORE INTO member_roles (member_id, role_id) VALUES (?1, ?2)")
        .bind(member_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Remove a role. Returns true when an assignment was removed.
pub async fn revoke(pool: &SqlitePool, member_id: i64, role_id: i64) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM member_roles WHERE member_id = ?1 AND role_id = ?2")
        .bind(member_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn member_has_role(pool: &SqlitePool, member_id: i64, role_id: i64) -> Result<bool, sqlx::Error> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM member_roles WHERE member_id = ?1 AND role_id = ?2",
    )
    .bind(member_id)
    .bind(role_id)
    .fetch_one(pool)
    .await?;
    Ok(n > 0)
}

/// Flip a role on or off. Returns whether the member holds it afterwards.
pub async fn toggle(pool: &SqlitePool, member_id: i64, role_id: i64) -> Result<bool, sqlx::Error> {
    if member_has_role(pool, member_id, role_id).await? {
        revoke(pool, member_id, role_id).await?;
        Ok(false)
    } else {
        assign(pool, member_id, role_id).await?;
        Ok(true)
    }
}

/// Grant one role to many members in a single transaction. Additive:
/// existing roles are kept, duplicates ignored. Returns the number of new
/// assignments.
pub async fn bulk_assign(pool: &SqlitePool, member_ids: &[i64], role_id: i64) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut created = 0;
    for member_id in member_ids {
        let res = sqlx::query(
            "INSERT OR IGNORE INTO member_roles (member_id, role_id) \
             SELECT id, ?2 FROM members WHERE id = ?1",
        )
        .bind(member_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;
        created += res.rows_affected();
    }
    tx.commit().await?;
    Ok(created)
}

/// Number of members holding the named role.
pub async fn count_members_with(pool: &SqlitePool, role_name: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM member_roles mr \
         JOIN roles r ON r.id = mr.role_id \
         WHERE r.role_name = ?1",
    )
    .bind(role_name)
    .fetch_one(pool)
    .await
}
