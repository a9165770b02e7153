use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::types::{AttendanceSlip, NewSlip, SlipRow};
use crate::models::form::GradeLevel;

// Everything except the key is read back as text: SQLite keeps whatever type
// a legacy import wrote, and one mistyped value must not fail the whole fetch.
const SELECT_SLIP: &str = "\
    SELECT id, CAST(beadle_email AS TEXT) AS beadle_email, \
           CAST(grade_level AS TEXT) AS grade_level, CAST(class_name AS TEXT) AS class_name, \
           CAST(class_start_time AS TEXT) AS class_start_time, \
           CAST(class_end_time AS TEXT) AS class_end_time, CAST(date AS TEXT) AS date, \
           CAST(teacher AS TEXT) AS teacher, CAST(subject AS TEXT) AS subject, \
           CAST(teacher_present AS TEXT) AS teacher_present, \
           CAST(teacher_arrival_time AS TEXT) AS teacher_arrival_time, \
           CAST(substitute_received AS TEXT) AS substitute_received, \
           CAST(homework_given AS TEXT) AS homework_given, \
           CAST(students_present AS TEXT) AS students_present, \
           CAST(absent_students AS TEXT) AS absent_students, \
           CAST(late_students AS TEXT) AS late_students, \
           CAST(is_double_session AS TEXT) AS is_double_session, \
           CAST(created_at AS TEXT) AS created_at \
    FROM attendance_slips";

fn names_json(names: &[String]) -> String {
    serde_json::to_string(names).unwrap_or_else(|_| "[]".to_string())
}

/// Store a new slip. Slips are never edited afterwards.
pub async fn create(pool: &SqlitePool, new: &NewSlip) -> Result<i64, sqlx::Error> {
    let res = sqlx::query(
        "INSERT INTO attendance_slips (beadle_email, grade_level, class_name, class_start_time, \
             class_end_time, date, teacher, subject, teacher_present, teacher_arrival_time, \
             substitute_received, homework_given, students_present, absent_students, \
             late_students, is_double_session) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(&new.beadle_email)
    .bind(new.grade_level.label())
    .bind(&new.class_name)
    .bind(&new.class_start_time)
    .bind(&new.class_end_time)
    .bind(new.date.format("%Y-%m-%d").to_string())
    .bind(&new.teacher)
    .bind(&new.subject)
    .bind(super::types::yes_no(new.teacher_present))
    .bind(&new.teacher_arrival_time)
    .bind(new.substitute_received.map(super::types::yes_no))
    .bind(super::types::yes_no(new.homework_given))
    .bind(new.students_present)
    .bind(names_json(&new.absent_students))
    .bind(names_json(&new.late_students))
    .bind(new.is_double_session)
    .execute(pool)
    .await?;
    Ok(res.last_insert_rowid())
}

/// Raw rows for one date, unvalidated. The report generator applies its own skip policy.
pub async fn find_rows_by_date(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<SlipRow>, sqlx::Error> {
    let sql = format!("{SELECT_SLIP} WHERE date = ?1 ORDER BY id");
    sqlx::query_as::<_, SlipRow>(&sql)
        .bind(date.format("%Y-%m-%d").to_string())
        .fetch_all(pool)
        .await
}

pub async fn find_all_rows(pool: &SqlitePool) -> Result<Vec<SlipRow>, sqlx::Error> {
    let sql = format!("{SELECT_SLIP} ORDER BY id");
    sqlx::query_as::<_, SlipRow>(&sql).fetch_all(pool).await
}

/// Validated slips for a date, restricted to `grades` when given.
/// Rows that fail validation are logged and left out.
pub async fn find_by_date(
    pool: &SqlitePool,
    date: NaiveDate,
    grades: Option<&[GradeLevel]>,
) -> Result<Vec<AttendanceSlip>, sqlx::Error> {
    let rows = find_rows_by_date(pool, date).await?;
    let mut slips = validate_rows(rows);
    if let Some(grades) = grades {
        slips.retain(|s| grades.contains(&s.grade_level));
    }
    slips.sort_by(|a, b| {
        (a.grade_level, &a.class_start_time, &a.class_name, a.id)
            .cmp(&(b.grade_level, &b.class_start_time, &b.class_name, b.id))
    });
    Ok(slips)
}

/// Slips submitted by one beadle, newest first.
pub async fn find_by_submitter(
    pool: &SqlitePool,
    beadle_email: &str,
    limit: i64,
) -> Result<Vec<AttendanceSlip>, sqlx::Error> {
    let sql = format!("{SELECT_SLIP} WHERE beadle_email = ?1 ORDER BY date DESC, id DESC LIMIT ?2");
    let rows = sqlx::query_as::<_, SlipRow>(&sql)
        .bind(beadle_email)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(validate_rows(rows))
}

/// Number of slips per grade level label on a date.
pub async fn count_by_grade(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT COALESCE(grade_level, ''), COUNT(*) FROM attendance_slips \
         WHERE date = ?1 GROUP BY grade_level ORDER BY grade_level",
    )
    .bind(date.format("%Y-%m-%d").to_string())
    .fetch_all(pool)
    .await
}

fn validate_rows(rows: Vec<SlipRow>) -> Vec<AttendanceSlip> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match AttendanceSlip::try_from(row) {
                Ok(slip) => Some(slip),
                Err(defect) => {
                    log::warn!("Skipping attendance slip {id}: {defect}");
                    None
                }
            }
        })
        .collect()
}
