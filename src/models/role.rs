mod queries;
pub mod scope;
pub mod types;

pub use queries::*;
pub use scope::{filter_members_in_scope, RoleSet, ScopeError, SupervisorScope};
pub use types::*;
