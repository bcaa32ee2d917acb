//! API client core for the library management console.
//!
//! # Overview
//! Every console screen is a form, one HTTP call and a notice. This crate
//! holds the pieces behind that: typed DTOs, the `ApiResponse` envelope,
//! request building and response normalization, an async client over a
//! pluggable transport, client-side validation, the remembered-email store
//! and the page controllers that tie them together.
//!
//! # Design
//! - `LibraryClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` normalizes an `HttpResponse` into an envelope.
//! - `ApiClient` runs the round-trip through a `Transport`; the reqwest
//!   transport keeps the session cookie between calls.
//! - Every operation settles to exactly one of data or error, never both.
//!   Transport failures become status 500.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod pages;
pub mod storage;
pub mod transport;
pub mod types;
pub mod validation;

pub use api::ApiClient;
pub use client::LibraryClient;
pub use config::ClientConfig;
pub use envelope::{ApiFailure, ApiResponse};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileStore, KeyValueStore, MemoryStore, REMEMBER_EMAIL_KEY};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Activity, AdminStats, CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse,
    PendingUser, RegisterRequest, RegisterResponse, Role, UserInfo, VerifyAction, VerifyUserRequest,
};
pub use validation::{FormErrors, LoginForm, RegistrationForm};
