//! DTOs for the library management API.
//!
//! Field names follow the backend's snake_case JSON. Values the backend may
//! send as `null` (role names, timestamps) are `Option`s.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The session user as reported by login and `/api/auth/me`.
///
/// `/me` additionally carries the profile fields; login omits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role_name: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
}

impl UserInfo {
    pub fn is_admin(&self) -> bool {
        self.role_name.as_deref() == Some("Admin")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUserResponse {
    pub user: UserInfo,
}

/// Plain confirmation returned by logout and verify-user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminStats {
    pub total_students: i64,
    pub total_books: i64,
    pub books_borrowed: i64,
    pub overdue_books: i64,
    pub pending_verifications: i64,
}

/// One audit-log entry from `/api/admin/recent-activities`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub user_name: String,
    pub action: String,
    pub table_name: String,
    pub timestamp: Option<String>,
}

/// A registration awaiting admin verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_name: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerifyAction {
    Approve,
    Reject,
}

/// Body of `PUT /api/admin/verify-user/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyUserRequest {
    pub action: VerifyAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_action_serializes_lowercase() {
        let body = serde_json::to_value(VerifyUserRequest {
            action: VerifyAction::Reject,
        })
        .unwrap();
        assert_eq!(body["action"], "reject");
    }

    #[test]
    fn login_user_without_profile_fields_parses() {
        let user: UserInfo = serde_json::from_str(
            r#"{"user_id":1,"name":"System Admin","email":"admin@library.com","role_name":"Admin","status":"APPROVED"}"#,
        )
        .unwrap();
        assert!(user.is_admin());
        assert!(user.phone.is_none());
    }

    #[test]
    fn null_role_is_not_admin() {
        let user: UserInfo = serde_json::from_str(
            r#"{"user_id":7,"name":"Orphan","email":"o@x.io","role_name":null,"status":"APPROVED"}"#,
        )
        .unwrap();
        assert!(!user.is_admin());
    }

    #[test]
    fn activity_accepts_null_timestamp() {
        let activity: Activity = serde_json::from_str(
            r#"{"user_name":"System","action":"CREATE","table_name":"users","timestamp":null}"#,
        )
        .unwrap();
        assert!(activity.timestamp.is_none());
    }
}
