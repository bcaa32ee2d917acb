//! Async API client: builds a request, runs it through a `Transport` and
//! normalizes the outcome into an `ApiResponse`.
//!
//! Every operation makes exactly one attempt. Nothing here returns `Err`:
//! transport failures become a `Network error` envelope with status 500.

use crate::client::LibraryClient;
use crate::config::ClientConfig;
use crate::envelope::{ApiResponse, CLIENT_FAILURE_STATUS};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    Activity, AdminStats, CurrentUserResponse, LoginRequest, LoginResponse, MessageResponse,
    PendingUser, RegisterRequest, RegisterResponse, Role, VerifyAction,
};

#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    client: LibraryClient,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client for the configured base URL with a fresh cookie jar.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(&config.api_url, ReqwestTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: LibraryClient::new(base_url),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub async fn register(&self, input: &RegisterRequest) -> ApiResponse<RegisterResponse> {
        self.dispatch(self.client.build_register(input), LibraryClient::parse_register)
            .await
    }

    pub async fn login(&self, input: &LoginRequest) -> ApiResponse<LoginResponse> {
        self.dispatch(self.client.build_login(input), LibraryClient::parse_login)
            .await
    }

    pub async fn logout(&self) -> ApiResponse<MessageResponse> {
        self.dispatch(Ok(self.client.build_logout()), LibraryClient::parse_logout)
            .await
    }

    pub async fn current_user(&self) -> ApiResponse<CurrentUserResponse> {
        self.dispatch(
            Ok(self.client.build_current_user()),
            LibraryClient::parse_current_user,
        )
        .await
    }

    pub async fn roles(&self) -> ApiResponse<Vec<Role>> {
        self.dispatch(Ok(self.client.build_roles()), LibraryClient::parse_roles)
            .await
    }

    pub async fn admin_stats(&self) -> ApiResponse<AdminStats> {
        self.dispatch(
            Ok(self.client.build_admin_stats()),
            LibraryClient::parse_admin_stats,
        )
        .await
    }

    pub async fn recent_activities(&self) -> ApiResponse<Vec<Activity>> {
        self.dispatch(
            Ok(self.client.build_recent_activities()),
            LibraryClient::parse_recent_activities,
        )
        .await
    }

    pub async fn pending_users(&self) -> ApiResponse<Vec<PendingUser>> {
        self.dispatch(
            Ok(self.client.build_pending_users()),
            LibraryClient::parse_pending_users,
        )
        .await
    }

    pub async fn verify_user(&self, user_id: i64, action: VerifyAction) -> ApiResponse<MessageResponse> {
        self.dispatch(
            self.client.build_verify_user(user_id, action),
            LibraryClient::parse_verify_user,
        )
        .await
    }

    async fn dispatch<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: fn(&LibraryClient, HttpResponse) -> ApiResponse<R>,
    ) -> ApiResponse<R> {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "could not build request");
                return ApiResponse::failure(err.to_string(), CLIENT_FAILURE_STATUS);
            }
        };

        let method = request.method.as_str();
        let url = request.url.clone();
        tracing::debug!(method, url = %url, "sending request");

        match self.transport.execute(request).await {
            Ok(response) => {
                tracing::debug!(method, url = %url, status = response.status, "response received");
                parse(&self.client, response)
            }
            Err(err) => {
                tracing::warn!(method, url = %url, error = %err, "request did not reach the server");
                ApiResponse::network_error()
            }
        }
    }
}
