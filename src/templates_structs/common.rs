use askama::Template;

use super::PageContext;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub errors: Vec<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub email: String,
    pub full_name: String,
    pub form_class: String,
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub full_name: String,
    pub form_class: String,
}

/// An `<option>` with its selected state worked out up front.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn grade_levels(selected: &str) -> Vec<SelectOption> {
        crate::models::form::GradeLevel::ALL
            .into_iter()
            .map(|g| SelectOption {
                value: g.label().to_string(),
                label: g.label().to_string(),
                selected: g.label() == selected,
            })
            .collect()
    }
}
