//! Create-account screen.
//!
//! Roles come from the server; Admin is never offered. Until the list loads,
//! or if it cannot be loaded, the built-in Student/Teacher pair is used.

use crate::api::ApiClient;
use crate::envelope::ApiResponse;
use crate::pages::{Notice, Outcome, Route};
use crate::transport::Transport;
use crate::types::Role;
use crate::validation::{FormErrors, RegistrationForm};

const ADMIN_ROLE: &str = "Admin";

fn fallback_roles() -> Vec<Role> {
    [(1, "Student"), (2, "Teacher")]
        .into_iter()
        .map(|(role_id, role_name)| Role {
            role_id,
            role_name: role_name.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RegisterPage {
    pub form: RegistrationForm,
    roles: Vec<Role>,
}

impl Default for RegisterPage {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterPage {
    /// Open the page with the first role preselected.
    pub fn new() -> Self {
        let roles = fallback_roles();
        let form = RegistrationForm {
            role_id: roles.first().map(|r| r.role_id),
            ..RegistrationForm::default()
        };
        Self { form, roles }
    }

    /// Roles offered in the selector.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Select a role by name. Returns `false` if it is not on offer.
    pub fn select_role(&mut self, role_name: &str) -> bool {
        match self.roles.iter().find(|r| r.role_name == role_name) {
            Some(role) => {
                self.form.role_id = Some(role.role_id);
                true
            }
            None => false,
        }
    }

    pub async fn load_roles<T: Transport>(&mut self, api: &ApiClient<T>) -> Outcome {
        let mut outcome = Outcome::default();
        match api.roles().await {
            ApiResponse::Success(roles) => {
                let offered: Vec<Role> = roles.into_iter().filter(|r| r.role_name != ADMIN_ROLE).collect();
                if offered.is_empty() {
                    outcome.notify(Notice::error("No roles available for registration"));
                } else {
                    self.roles = offered;
                }
            }
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }

        let still_offered = self
            .form
            .role_id
            .is_some_and(|id| self.roles.iter().any(|r| r.role_id == id));
        if !still_offered {
            self.form.role_id = self.roles.first().map(|r| r.role_id);
        }
        outcome
    }

    /// Validate and create the account. Field errors are returned without
    /// contacting the server.
    pub async fn submit<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<Outcome, FormErrors> {
        self.form.check()?;
        let mut outcome = Outcome::default();
        let Some(request) = self.form.to_request() else {
            return Ok(outcome);
        };

        match api.register(&request).await {
            ApiResponse::Success(body) => {
                tracing::info!(user_id = body.user_id, "account created");
                outcome.notify(Notice::success(body.message));
                outcome.navigate = Some(Route::Login);
            }
            ApiResponse::Failure(failure) => outcome.notify(Notice::error(failure.error)),
        }
        Ok(outcome)
    }
}
