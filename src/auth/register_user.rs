//! The registration page, its form validation, and the handler that creates new users.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, Username, ValidatedPassword, create_user, set_auth_cookie, username_exists,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, form_input, log_in_register, password_input},
    timezone::get_local_offset,
};

/// Client-side hint for the minimum password length. The server checks strength with zxcvbn.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

pub const USERNAME_TAKEN_ERROR_MSG: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH_ERROR_MSG: &str = "The two password fields didn't match.";

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Error messages for each field of a [RegistrationForm].
#[derive(Debug, Default, PartialEq)]
pub struct RegistrationErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegistrationErrors {
    fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }
}

/// Why a registration could not go ahead.
#[derive(Debug, PartialEq)]
pub enum RegistrationFailure {
    /// The form has errors the user can fix.
    Invalid(RegistrationErrors),
    /// The database could not be checked.
    Store(Error),
}

impl From<Error> for RegistrationFailure {
    fn from(error: Error) -> Self {
        RegistrationFailure::Store(error)
    }
}

/// Check that the username is well formed and free, the password is strong
/// and both password fields match.
///
/// Every field is checked so that all problems are reported at once.
///
/// # Errors
///
/// Returns [RegistrationFailure::Invalid] with a message per failing field,
/// or [RegistrationFailure::Store] if the user table could not be queried.
pub fn validate_registration(
    form: &RegistrationForm,
    connection: &Connection,
) -> Result<(Username, ValidatedPassword), RegistrationFailure> {
    let mut errors = RegistrationErrors::default();

    let username = match Username::new(&form.username) {
        Ok(username) if username_exists(&username, connection)? => {
            errors.username = Some(USERNAME_TAKEN_ERROR_MSG.to_owned());
            None
        }
        Ok(username) => Some(username),
        Err(error) => {
            errors.username = Some(error.to_string());
            None
        }
    };

    let password = match ValidatedPassword::new(&form.password, &[form.username.trim()]) {
        Ok(password) => Some(password),
        Err(Error::TooWeak(feedback)) => {
            errors.password = Some(format!("This password is too weak. {feedback}").trim().to_owned());
            None
        }
        Err(error) => return Err(error.into()),
    };

    if form.password != form.confirm_password {
        errors.confirm_password = Some(PASSWORD_MISMATCH_ERROR_MSG.to_owned());
    }

    match (username, password) {
        (Some(username), Some(password)) if errors.is_empty() => Ok((username, password)),
        _ => Err(RegistrationFailure::Invalid(errors)),
    }
}

fn registration_form(username: &str, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::REGISTER_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (form_input("Username", "username", "text", username, errors.username.as_deref()))
            (password_input(
                "Password",
                "password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.password.as_deref(),
            ))
            (password_input(
                "Confirm Password",
                "confirm_password",
                PASSWORD_INPUT_MIN_LENGTH,
                errors.confirm_password.as_deref(),
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

fn registration_view(username: &str, errors: &RegistrationErrors) -> Markup {
    let form = registration_form(username, errors);
    let content = log_in_register("Create an account", &form);
    base("Register", &[], &content)
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    registration_view("", &RegistrationErrors::default()).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a user, log them in and redirect to the dashboard.
///
/// If the form is invalid, the registration page is shown again with the
/// errors and the submitted username.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, Error> {
    let validation = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        validate_registration(&form, &connection)
    };

    let (username, password) = match validation {
        Ok(valid) => valid,
        Err(RegistrationFailure::Invalid(errors)) => {
            return Ok(registration_view(&form.username, &errors).into_response());
        }
        Err(RegistrationFailure::Store(error)) => return Err(error),
    };

    // Do not hold the database lock while hashing.
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("Could not hash password: {error}"))?;

    let created = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(username, password_hash, &connection)
    };

    // The username may have been taken while the password was being hashed.
    let user = match created {
        Ok(user) => user,
        Err(Error::DuplicateUsername) => {
            let errors = RegistrationErrors {
                username: Some(USERNAME_TAKEN_ERROR_MSG.to_owned()),
                ..Default::default()
            };
            return Ok(registration_view(&form.username, &errors).into_response());
        }
        Err(error) => return Err(error),
    };

    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let jar = set_auth_cookie(jar, user.id, state.cookie_duration, local_offset)?;

    tracing::info!("Registered user {}", user.username);

    Ok((jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response())
}

#[cfg(test)]
mod validate_registration_tests {
    use rusqlite::Connection;

    use crate::auth::{PasswordHash, Username, create_user, create_user_table};

    use super::{
        PASSWORD_MISMATCH_ERROR_MSG, RegistrationFailure, RegistrationForm,
        USERNAME_TAKEN_ERROR_MSG, validate_registration,
    };

    const STRONG_PASSWORD: &str = "correct-horse-battery-staple-42";

    fn get_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        connection
    }

    fn form(username: &str, password: &str, confirm_password: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    #[track_caller]
    fn must_get_errors(
        result: Result<(Username, crate::auth::ValidatedPassword), RegistrationFailure>,
    ) -> super::RegistrationErrors {
        match result {
            Err(RegistrationFailure::Invalid(errors)) => errors,
            Err(RegistrationFailure::Store(error)) => panic!("unexpected store error {error}"),
            Ok(_) => panic!("expected validation errors"),
        }
    }

    #[test]
    fn accepts_valid_registration() {
        let connection = get_connection();

        let (username, _) = validate_registration(
            &form("alice", STRONG_PASSWORD, STRONG_PASSWORD),
            &connection,
        )
        .unwrap();

        assert_eq!(username.as_str(), "alice");
    }

    #[test]
    fn rejects_taken_username() {
        let connection = get_connection();
        create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hash"),
            &connection,
        )
        .unwrap();

        let errors = must_get_errors(validate_registration(
            &form("alice", STRONG_PASSWORD, STRONG_PASSWORD),
            &connection,
        ));

        assert_eq!(errors.username.as_deref(), Some(USERNAME_TAKEN_ERROR_MSG));
        assert_eq!(errors.password, None);
        assert_eq!(errors.confirm_password, None);
    }

    #[test]
    fn reports_every_failing_field() {
        let connection = get_connection();

        let errors = must_get_errors(validate_registration(
            &form("", "password", "passwort"),
            &connection,
        ));

        assert_eq!(errors.username.as_deref(), Some("This field is required."));
        assert!(
            errors
                .password
                .as_deref()
                .is_some_and(|message| message.starts_with("This password is too weak."))
        );
        assert_eq!(
            errors.confirm_password.as_deref(),
            Some(PASSWORD_MISMATCH_ERROR_MSG)
        );
    }

    #[test]
    fn rejects_mismatched_passwords() {
        let connection = get_connection();

        let errors = must_get_errors(validate_registration(
            &form("alice", STRONG_PASSWORD, "something-else-entirely-99"),
            &connection,
        ));

        assert_eq!(errors.username, None);
        assert_eq!(errors.password, None);
        assert_eq!(
            errors.confirm_password.as_deref(),
            Some(PASSWORD_MISMATCH_ERROR_MSG)
        );
    }
}
