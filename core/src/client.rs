//! Stateless HTTP request builder and response normalizer for the library API.
//!
//! # Design
//! `LibraryClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! turns an `HttpResponse` into an `ApiResponse` envelope. `ApiClient` runs
//! the round-trip in between.

use serde::Serialize;

use crate::envelope::{normalize, ApiResponse};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Activity, AdminStats, CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse,
    PendingUser, RegisterRequest, RegisterResponse, Role, VerifyAction, VerifyUserRequest,
};

/// Synchronous, stateless client for the library management API.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    base_url: String,
}

impl LibraryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- builders ---

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/register", input)
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/login", input)
    }

    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/api/auth/logout", Some("{}".to_string()))
    }

    pub fn build_current_user(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/auth/me", None)
    }

    pub fn build_roles(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/auth/roles", None)
    }

    pub fn build_admin_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/admin/stats", None)
    }

    pub fn build_recent_activities(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/admin/recent-activities", None)
    }

    pub fn build_pending_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/admin/pending-users", None)
    }

    pub fn build_verify_user(&self, user_id: i64, action: VerifyAction) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Put,
            &format!("/api/admin/verify-user/{user_id}"),
            &VerifyUserRequest { action },
        )
    }

    // --- parsers ---

    pub fn parse_register(&self, response: HttpResponse) -> ApiResponse<RegisterResponse> {
        normalize(&response)
    }

    pub fn parse_login(&self, response: HttpResponse) -> ApiResponse<LoginResponse> {
        normalize(&response)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> ApiResponse<MessageResponse> {
        normalize(&response)
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> ApiResponse<CurrentUserResponse> {
        normalize(&response)
    }

    pub fn parse_roles(&self, response: HttpResponse) -> ApiResponse<Vec<Role>> {
        normalize(&response)
    }

    pub fn parse_admin_stats(&self, response: HttpResponse) -> ApiResponse<AdminStats> {
        normalize(&response)
    }

    pub fn parse_recent_activities(&self, response: HttpResponse) -> ApiResponse<Vec<Activity>> {
        normalize(&response)
    }

    pub fn parse_pending_users(&self, response: HttpResponse) -> ApiResponse<Vec<PendingUser>> {
        normalize(&response)
    }

    pub fn parse_verify_user(&self, response: HttpResponse) -> ApiResponse<MessageResponse> {
        normalize(&response)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: json_headers(),
            body,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, path, Some(body)))
    }
}

/// Every call declares a JSON body, including bodiless GETs.
fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}
