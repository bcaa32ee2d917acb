//! Sign-in screen.

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::pages::{Notice, Outcome, Route};
use crate::storage::{remembered_email, update_remembered_email, FileStore, KeyValueStore};
use crate::transport::Transport;
use crate::types::UserInfo;
use crate::validation::{FormErrors, LoginForm};

pub const NON_ADMIN_NOTICE: &str = "Student/Teacher portal not implemented yet.";
pub const REMEMBER_FAILED_NOTICE: &str = "Your email could not be remembered on this device.";

#[derive(Debug)]
pub struct LoginPage<S> {
    pub form: LoginForm,
    pub remember_me: bool,
    store: S,
    user: Option<UserInfo>,
}

impl LoginPage<FileStore> {
    /// Open the page over the file store at the configured `storage_path`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(FileStore::from_config(config))
    }
}

impl<S: KeyValueStore> LoginPage<S> {
    /// Open the page, prefilling the email if one was remembered.
    pub fn new(store: S) -> Self {
        let remembered = remembered_email(&store).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read remembered email");
            None
        });
        Self {
            form: LoginForm {
                email: remembered.clone().unwrap_or_default(),
                password: String::new(),
            },
            remember_me: remembered.is_some(),
            store,
            user: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The user signed in by the last successful submission.
    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn can_submit(&self) -> bool {
        self.form.check().is_ok()
    }

    /// Validate, sign in and decide where to go.
    ///
    /// Field errors are returned without contacting the server.
    pub async fn submit<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<Outcome, FormErrors> {
        self.form.check()?;
        let request = self.form.to_request();

        let mut outcome = Outcome::default();
        match api.login(&request).await {
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
            ApiResponse::Success(body) => {
                outcome.notify(Notice::success(format!("Welcome back, {}!", body.user.name)));
                if let Err(err) = update_remembered_email(&mut self.store, &request.email, self.remember_me) {
                    tracing::warn!(error = %err, "could not update remembered email");
                    outcome.notify(Notice::error(REMEMBER_FAILED_NOTICE));
                }
                if body.user.is_admin() {
                    outcome.navigate = Some(Route::Admin);
                } else {
                    outcome.notify(Notice::info(NON_ADMIN_NOTICE));
                }
                tracing::info!(user_id = body.user.user_id, role = ?body.user.role_name, "signed in");
                self.user = Some(body.user);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpResponse;
    use crate::pages::NoticeLevel;
    use crate::storage::{MemoryStore, REMEMBER_EMAIL_KEY};
    use crate::transport::MockTransport;

    /// Reads as empty, refuses every write.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, ApiError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), ApiError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn remove(&mut self, _key: &str) -> Result<(), ApiError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[test]
    fn prefills_remembered_email() {
        let mut store = MemoryStore::new();
        store.set(REMEMBER_EMAIL_KEY, "ada@school.edu").unwrap();
        let page = LoginPage::new(store);
        assert_eq!(page.form.email, "ada@school.edu");
        assert!(page.remember_me);
        assert!(!page.can_submit());
    }

    #[test]
    fn starts_empty_without_remembered_email() {
        let page = LoginPage::new(MemoryStore::new());
        assert!(page.form.email.is_empty());
        assert!(!page.remember_me);
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();
        let api = ApiClient::new("http://localhost:5000", transport);

        let mut page = LoginPage::new(MemoryStore::new());
        page.form.email = "a@b".to_string();
        page.form.password = "secret123".to_string();

        let errors = page.submit(&api).await.unwrap_err();
        assert_eq!(errors.get("email"), Some("Enter a valid email address."));
    }

    #[tokio::test]
    async fn failed_remember_is_reported_but_login_proceeds() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: r#"{"message":"Login successful","user":{"user_id":1,"name":"System Admin","email":"admin@library.com","role_name":"Admin","status":"APPROVED"}}"#
                    .to_string(),
            })
        });
        let api = ApiClient::new("http://localhost:5000", transport);

        let mut page = LoginPage::new(ReadOnlyStore);
        page.form.email = "admin@library.com".to_string();
        page.form.password = "admin123".to_string();
        page.remember_me = true;

        let outcome = page.submit(&api).await.unwrap();
        assert_eq!(outcome.navigate, Some(Route::Admin));
        assert_eq!(outcome.notices[0].level, NoticeLevel::Success);
        assert_eq!(outcome.errors().collect::<Vec<_>>(), [REMEMBER_FAILED_NOTICE]);
        assert!(page.user().is_some());
    }
}
