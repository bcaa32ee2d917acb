//! Admin dashboard: statistics, recent activity and the verification queue.

use chrono::{DateTime, NaiveDateTime};

use crate::api::ApiClient;
use crate::envelope::ApiResponse;
use crate::pages::{Notice, Outcome, Route};
use crate::transport::Transport;
use crate::types::{Activity, AdminStats, PendingUser, VerifyAction};

const TIMESTAMP_DISPLAY: &str = "%m/%d/%Y, %I:%M %p";

/// One labelled counter on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: i64,
}

/// An activity record ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub user_name: String,
    pub action: String,
    pub table_name: String,
    pub when: String,
}

/// Format an ISO-8601 timestamp as `MM/DD/YYYY, hh:mm AM`.
///
/// Offsets are honoured as written (no conversion to local time). Anything
/// unparseable is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"));
    match parsed {
        Ok(dt) => dt.format(TIMESTAMP_DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    stats: AdminStats,
    activities: Vec<Activity>,
    pending: Vec<PendingUser>,
    loading: bool,
}

impl Default for AdminDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self {
            stats: AdminStats::default(),
            activities: Vec::new(),
            pending: Vec::new(),
            loading: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn stats(&self) -> &AdminStats {
        &self.stats
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn pending_users(&self) -> &[PendingUser] {
        &self.pending
    }

    pub fn stat_tiles(&self) -> [StatTile; 5] {
        let s = &self.stats;
        [
            StatTile { label: "Total Students", value: s.total_students },
            StatTile { label: "Total Books", value: s.total_books },
            StatTile { label: "Books Borrowed", value: s.books_borrowed },
            StatTile { label: "Overdue Books", value: s.overdue_books },
            StatTile { label: "Pending Verifications", value: s.pending_verifications },
        ]
    }

    pub fn activity_rows(&self) -> Vec<ActivityRow> {
        self.activities
            .iter()
            .map(|a| ActivityRow {
                user_name: a.user_name.clone(),
                action: a.action.clone(),
                table_name: a.table_name.clone(),
                when: a.timestamp.as_deref().map(format_timestamp).unwrap_or_default(),
            })
            .collect()
    }

    /// Send anyone who is not a signed-in admin back to the login screen.
    pub async fn ensure_admin<T: Transport>(&self, api: &ApiClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        match api.current_user().await {
            ApiResponse::Success(body) if body.user.is_admin() => {}
            ApiResponse::Success(_) => {
                outcome.notify(Notice::error("Admin access required"));
                outcome.navigate = Some(Route::Login);
            }
            ApiResponse::Failure(failure) => {
                outcome.notify(Notice::error(failure.error));
                outcome.navigate = Some(Route::Login);
            }
        }
        outcome
    }

    /// Fetch statistics, then recent activity. A failed fetch leaves the
    /// previous value in place.
    pub async fn load<T: Transport>(&mut self, api: &ApiClient<T>) -> Outcome {
        self.loading = true;
        let mut outcome = Outcome::default();

        match api.admin_stats().await {
            ApiResponse::Success(stats) => self.stats = stats,
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }
        match api.recent_activities().await {
            ApiResponse::Success(activities) => self.activities = activities,
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }

        self.loading = false;
        outcome
    }

    pub async fn load_pending<T: Transport>(&mut self, api: &ApiClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        match api.pending_users().await {
            ApiResponse::Success(pending) => self.pending = pending,
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }
        outcome
    }

    /// Approve or reject a pending registration.
    pub async fn verify<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        user_id: i64,
        action: VerifyAction,
    ) -> Outcome {
        let mut outcome = Outcome::default();
        match api.verify_user(user_id, action).await {
            ApiResponse::Success(body) => {
                self.pending.retain(|u| u.user_id != user_id);
                let pending = &mut self.stats.pending_verifications;
                *pending = pending.saturating_sub(1).max(0);
                outcome.notify(Notice::success(body.message));
            }
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }
        outcome
    }

    /// End the session. The user lands on the login screen either way.
    pub async fn logout<T: Transport>(&mut self, api: &ApiClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        match api.logout().await {
            ApiResponse::Success(_) => outcome.notify(Notice::success("Logged out.")),
            ApiResponse::Failure(failure) => {
                tracing::warn!(error = %failure.error, status = failure.status, "logout failed");
                outcome.notify(Notice::error("Logout failed"));
            }
        }
        outcome.navigate = Some(Route::Login);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpResponse;
    use crate::pages::NoticeLevel;
    use crate::transport::MockTransport;

    #[test]
    fn formats_naive_iso_timestamps() {
        assert_eq!(format_timestamp("2024-03-05T14:07:09.123456"), "03/05/2024, 02:07 PM");
        assert_eq!(format_timestamp("2024-12-31T00:30:00"), "12/31/2024, 12:30 AM");
    }

    #[test]
    fn formats_offset_timestamps_as_written() {
        assert_eq!(format_timestamp("2024-03-05T09:15:00+02:00"), "03/05/2024, 09:15 AM");
    }

    #[test]
    fn unparseable_timestamp_is_returned_unchanged() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn tiles_start_at_zero_in_display_order() {
        let dashboard = AdminDashboard::new();
        assert!(dashboard.is_loading());
        let tiles = dashboard.stat_tiles();
        let labels: Vec<_> = tiles.iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            ["Total Students", "Total Books", "Books Borrowed", "Overdue Books", "Pending Verifications"]
        );
        assert!(tiles.iter().all(|t| t.value == 0));
    }

    #[tokio::test]
    async fn failed_stats_keep_previous_values_and_still_load_activity() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(2).returning(|req| {
            if req.url.ends_with("/stats") {
                Ok(HttpResponse {
                    status: 500,
                    headers: Vec::new(),
                    body: r#"{"error":"database unavailable","status":500}"#.to_string(),
                })
            } else {
                Ok(HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: r#"[{"user_name":"System","action":"CREATE","table_name":"users","timestamp":null}]"#
                        .to_string(),
                })
            }
        });
        let api = ApiClient::new("http://localhost:5000", transport);

        let mut dashboard = AdminDashboard::new();
        let outcome = dashboard.load(&api).await;

        assert!(!dashboard.is_loading());
        assert_eq!(outcome.errors().collect::<Vec<_>>(), ["database unavailable"]);
        assert_eq!(*dashboard.stats(), AdminStats::default());
        assert_eq!(dashboard.activity_rows()[0].when, "");
    }

    #[tokio::test]
    async fn logout_navigates_to_login_even_on_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Err(ApiError::Transport("reset".to_string())));
        let api = ApiClient::new("http://localhost:5000", transport);

        let outcome = AdminDashboard::new().logout(&api).await;
        assert_eq!(outcome.navigate, Some(Route::Login));
        assert_eq!(outcome.notices, [Notice::error("Logout failed")]);
        assert_eq!(outcome.notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn pending_count_never_goes_below_zero() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|req| {
            let body = if req.url.ends_with("/stats") {
                r#"{"total_students":0,"total_books":0,"books_borrowed":0,"overdue_books":0,"pending_verifications":-9223372036854775808}"#
            } else if req.url.ends_with("/recent-activities") {
                "[]"
            } else {
                r#"{"message":"User approved successfully"}"#
            };
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            })
        });
        let api = ApiClient::new("http://localhost:5000", transport);

        let mut dashboard = AdminDashboard::new();
        dashboard.load(&api).await;
        assert_eq!(dashboard.stats().pending_verifications, i64::MIN);

        let outcome = dashboard.verify(&api, 7, VerifyAction::Approve).await;
        assert_eq!(outcome.notices, [Notice::success("User approved successfully")]);
        assert_eq!(dashboard.stats().pending_verifications, 0);
    }
}
