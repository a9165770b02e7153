//! Role assignment queries.

mod common;

use beadle::models::{member, role};
use common::*;

#[tokio::test]
async fn seed_is_idempotent() {
    let pool = setup_test_db().await;
    let before = role::find_all(&pool).await.unwrap().len();
    role::seed(&pool).await.unwrap();
    role::seed(&pool).await.unwrap();
    assert_eq!(role::find_all(&pool).await.unwrap().len(), before);
    assert!(role::find_by_name(&pool, "supervisor_5").await.unwrap().is_some());
}

#[tokio::test]
async fn toggle_grants_then_removes() {
    let pool = setup_test_db().await;
    let id = insert_member(&pool, "s@school.local", "Student", Some("2-1")).await;
    let beadle = role::find_by_name(&pool, role::BEADLE).await.unwrap().unwrap();

    assert!(role::toggle(&pool, id, beadle.id).await.unwrap());
    assert!(role::member_has_role(&pool, id, beadle.id).await.unwrap());

    assert!(!role::toggle(&pool, id, beadle.id).await.unwrap());
    assert!(!role::member_has_role(&pool, id, beadle.id).await.unwrap());
}

#[tokio::test]
async fn assign_twice_keeps_one_row() {
    let pool = setup_test_db().await;
    let id = insert_member(&pool, "s@school.local", "Student", None).await;
    let beadle = role::find_by_name(&pool, role::BEADLE).await.unwrap().unwrap();

    assert!(role::assign(&pool, id, beadle.id).await.unwrap());
    assert!(!role::assign(&pool, id, beadle.id).await.unwrap());
    assert_eq!(role::find_for_member(&pool, id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn roles_come_back_in_assignment_order() {
    let pool = setup_test_db().await;
    let id = insert_member(&pool, "s@school.local", "Student", None).await;
    grant(&pool, id, "supervisor_4").await;
    grant(&pool, id, "beadle").await;

    let names: Vec<String> = role::find_for_member(&pool, id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.role_name)
        .collect();
    assert_eq!(names, vec!["supervisor_4", "beadle"]);
}

#[tokio::test]
async fn bulk_assign_is_additive() {
    let pool = setup_test_db().await;
    let mut ids = vec![];
    for i in 0..4 {
        ids.push(insert_member(&pool, &format!("m{i}@school.local"), "Member", Some("1-1")).await);
    }
    grant(&pool, ids[0], "beadle").await;
    grant(&pool, ids[1], "supervisor_1").await;

    let beadle = role::find_by_name(&pool, role::BEADLE).await.unwrap().unwrap();
    // Unknown ids are ignored.
    let created = role::bulk_assign(&pool, &[ids[0], ids[1], ids[2], ids[3], 9999], beadle.id)
        .await
        .unwrap();
    assert_eq!(created, 3);

    for id in &ids {
        assert!(role::member_has_role(&pool, *id, beadle.id).await.unwrap());
    }
    // Existing roles survive.
    let sup = role::find_by_name(&pool, "supervisor_1").await.unwrap().unwrap();
    assert!(role::member_has_role(&pool, ids[1], sup.id).await.unwrap());
    assert_eq!(role::count_members_with(&pool, role::BEADLE).await.unwrap(), 4);
}

#[tokio::test]
async fn deleting_member_removes_assignments() {
    let pool = setup_test_db().await;
    let id = insert_member(&pool, "gone@school.local", "Gone", Some("3-2")).await;
    grant(&pool, id, "beadle").await;

    assert!(member::delete(&pool, id).await.unwrap());
    assert!(member::find_summary_by_id(&pool, id).await.unwrap().is_none());
    assert_eq!(role::count_members_with(&pool, role::BEADLE).await.unwrap(), 0);
    assert!(!member::delete(&pool, id).await.unwrap());
}

#[tokio::test]
async fn member_list_carries_roles() {
    let pool = setup_test_db().await;
    let a = insert_member(&pool, "a@school.local", "Alice", Some("5-1")).await;
    insert_member(&pool, "b@school.local", "Bob", None).await;
    grant(&pool, a, "beadle").await;

    let all = member::find_all_with_roles(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    let alice = all.iter().find(|m| m.member.id == a).unwrap();
    assert!(alice.has_role("beadle"));
    let bob = all.iter().find(|m| m.member.id != a).unwrap();
    assert!(bob.roles.is_empty());
}

#[tokio::test]
async fn email_lookup_ignores_case() {
    let pool = setup_test_db().await;
    let id = insert_member(&pool, "Mixed@School.local", "Mixed", None).await;
    let found = member::find_by_email(&pool, "mixed@school.local").await.unwrap().unwrap();
    assert_eq!(found.id, id);
}
