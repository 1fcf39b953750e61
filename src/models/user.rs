use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The signed-in user. Read-only to this client except for the password-change
/// pass-through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Authorization tier. Gates mutating actions and export/print features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

/// Everything a page can ask a role for. Views branch on `Role::allows` at
/// render time instead of hiding controls after the fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ViewProducts,
    ManageProducts,
    RecordStock,
    ExportReports,
    PrintReports,
}

impl Role {
    pub fn allows(&self, action: Action) -> bool {
        match self {
            Role::Admin => true,
            Role::Client => matches!(action, Action::ViewProducts),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Client => "CLIENT",
        }
    }
}

/// Payload for `PUT /auth/change-password`.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}
