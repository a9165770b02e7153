use actix_session::Session;

use crate::errors::AppError;

pub fn get_member_id(session: &Session) -> Option<i64> {
    session.get::<i64>("member_id").unwrap_or(None)
}

/// Member id of the logged-in member, or a session error that redirects to /login.
pub fn require_member_id(session: &Session) -> Result<i64, AppError> {
    get_member_id(session).ok_or_else(|| AppError::Session("Not logged in".to_string()))
}

/// Start a fresh session for `member_id`. Only the id is stored; roles are
/// loaded per request.
pub fn login(session: &Session, member_id: i64) -> Result<(), AppError> {
    session.renew();
    session
        .insert("member_id", member_id)
        .map_err(|e| AppError::Session(format!("Failed to store session: {e}")))
}

pub fn set_flash(session: &Session, msg: &str) {
    let _ = session.insert("flash", msg);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}
