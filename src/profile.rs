//! Profile page: read-only identity panel and the password-change flow.
//!
//! Validation runs client-side, in order, short-circuiting on the first
//! failure; only a fully valid change reaches the network.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::models::{PasswordChange, User};
use crate::render::{DetailPanel, Message};

static HAS_UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static HAS_LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid regex"));
static HAS_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("valid regex"));

/// Password strength rules, mirrored from the backend so weak passwords are
/// rejected before the request.
pub fn validate_password_strength(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(ClientError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if !HAS_UPPERCASE.is_match(password) {
        return Err(ClientError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !HAS_LOWERCASE.is_match(password) {
        return Err(ClientError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !HAS_DIGIT.is_match(password) {
        return Err(ClientError::validation(
            "Password must contain at least one digit",
        ));
    }
    if !HAS_SPECIAL.is_match(password) {
        return Err(ClientError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// Ordered validation for the change-password form: (a) new == confirm,
/// (b) strength, (c) new != current.
pub fn validate_password_change(
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<PasswordChange> {
    if new != confirm {
        return Err(ClientError::validation("New passwords do not match"));
    }
    validate_password_strength(new)?;
    if current == new {
        return Err(ClientError::validation(
            "New password must be different from current password",
        ));
    }
    Ok(PasswordChange {
        current_password: current.to_string(),
        new_password: new.to_string(),
    })
}

/// The profile page controller. Identity fields are display-only; the only
/// mutation is the password-change pass-through.
pub struct ProfilePage {
    user: User,
    changing_password: bool,
}

impl ProfilePage {
    pub fn new(user: User) -> Self {
        Self {
            user,
            changing_password: false,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn identity_panel(&self) -> DetailPanel {
        let joined = self
            .user
            .created_at
            .map(|t| t.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        DetailPanel::new("My Profile")
            .field("Full Name:", self.user.full_name())
            .field("Username:", self.user.username.clone())
            .field("Email:", self.user.email.clone())
            .field(
                "Phone:",
                self.user
                    .phone
                    .clone()
                    .unwrap_or_else(|| "Not provided".to_string()),
            )
            .field("Role:", self.user.role.label())
            .field("Member Since:", joined)
    }

    /// Validates and submits a password change. The submit control stays
    /// disabled for the duration of the request and is re-enabled on every
    /// outcome; the returned message auto-hides after its TTL.
    pub async fn change_password(
        &mut self,
        client: &ApiClient,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<Message> {
        if self.changing_password {
            return Err(ClientError::validation("A password change is already in progress"));
        }
        let payload = validate_password_change(current, new, confirm)?;

        self.changing_password = true;
        let result = client.change_password(&payload).await;
        self.changing_password = false;

        result.map(|_| {
            info!(username = %self.user.username, "password changed");
            Message::success("Password changed successfully!")
        })
    }

    pub fn is_changing_password(&self) -> bool {
        self.changing_password
    }
}
