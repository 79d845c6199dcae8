//! User accounts, password handling and cookie-based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod token;
mod user;

pub use cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register_user::{
    RegistrationErrors, RegistrationFailure, RegistrationForm, get_register_page, register_user,
    validate_registration,
};
pub use token::Token;
pub use user::{
    User, UserID, Username, UsernameError, create_user, create_user_table, get_user_by_id,
    get_user_by_username, update_password, username_exists,
};
