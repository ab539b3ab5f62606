//! Account handlers: signup and login.
//!
//! ```text
//! POST /signup  username=alice&email=a@x.com&password=Secret123!
//! POST /login   email=a@x.com&password=Secret123!
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::domain::{
    ACCOUNT_CREATED, Error, LOGIN_FIELDS_REQUIRED, LoginCredentials, SIGNUP_FIELDS_REQUIRED,
    SignupDetails, SignupValidationError, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redirect::see_other;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Login form body for `POST /login`.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Drop for LoginForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Signup form body for `POST /signup`.
#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Drop for SignupForm {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Confirmation body returned by signup.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create an account. No session is started; the client logs in next.
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    form: web::Form<SignupForm>,
) -> ApiResult<HttpResponse> {
    let details = SignupDetails::try_from_parts(&form.username, &form.email, &form.password)
        .map_err(map_signup_validation_error)?;
    state.signup.register(&details).await?;
    Ok(HttpResponse::Created().json(MessageResponse {
        message: ACCOUNT_CREATED.to_owned(),
    }))
}

fn map_signup_validation_error(err: SignupValidationError) -> Error {
    if err.is_missing_field() {
        return Error::invalid_request(SIGNUP_FIELDS_REQUIRED);
    }
    match &err {
        SignupValidationError::User(UserValidationError::UsernameTooLong { .. }) => {
            field_error("username", "too_long", err.to_string())
        }
        SignupValidationError::User(UserValidationError::EmailTooLong { .. }) => {
            field_error("email", "too_long", err.to_string())
        }
        _ => Error::invalid_request(err.to_string()),
    }
}

/// Authenticate and establish a session, then redirect home.
///
/// Unknown emails and wrong passwords produce the same `401` body.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&form.email, &form.password)
        .map_err(|_| Error::invalid_request(LOGIN_FIELDS_REQUIRED))?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(see_other("/"))
}
