//! Page controllers for the console screens.
//!
//! Each controller owns its form state and turns one user action into an
//! `Outcome`: the notices to show and, optionally, where to go next.
//! Submissions take `&mut self` for the duration of the request, so a
//! second submission cannot start until the first settles.

pub mod admin;
pub mod login;
pub mod register;

pub use admin::{format_timestamp, ActivityRow, AdminDashboard, StatTile};
pub use login::LoginPage;
pub use register::RegisterPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A transient message for the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub navigate: Option<Route>,
}

impl Outcome {
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.as_str())
    }
}
