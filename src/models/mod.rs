pub mod form;
pub mod member;
pub mod role;
pub mod slip;
