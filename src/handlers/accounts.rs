// handlers/accounts.rs - signup, login and logout
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{FormData, QueryData};
use crate::auth;
use crate::database::models::NewUser;
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::forms::{CleanForm, FormErrors, LoginForm, Rejected, SignupForm};
use crate::middleware::{flash, session, Flash};
use crate::routes::{HOME, LOGIN};
use crate::state::AppState;
use crate::views::{Page, View};

pub const INVALID_LOGIN: &str = "Please enter a correct username and password.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

const SIGNUP_FIELDS: &[&str] = &["username", "password", "password_confirm"];
const LOGIN_FIELDS: &[&str] = &["username", "password"];

fn signup_view(page: &Page, form: &SignupForm, errors: &FormErrors) -> View {
    page.view("signup.html")
        .with("form", form)
        .with("errors", &errors.by_field(SIGNUP_FIELDS))
        .with("form_errors", &errors.form)
}

fn login_view(page: &Page, form: &LoginForm, errors: &FormErrors) -> View {
    page.view("login.html")
        .with("form", form)
        .with("errors", &errors.by_field(LOGIN_FIELDS))
        .with("form_errors", &errors.form)
}

/// Only same-site absolute paths are followed after login.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control)
        && url::Url::parse(next).is_err()
}

pub async fn signup_form(page: Page) -> View {
    signup_view(&page, &SignupForm::default(), &FormErrors::default())
}

/// Create an account and send the user to log in. No session is started.
pub async fn signup(
    State(state): State<AppState>,
    page: Page,
    FormData(form): FormData<SignupForm>,
) -> Result<Response, AppError> {
    let rejected = |form: &SignupForm, errors: &FormErrors| {
        signup_view(&page, form, errors)
            .status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response()
    };

    let form = match form.clean() {
        Ok(form) => form,
        Err(Rejected { form, errors }) => return Ok(rejected(&form, &errors)),
    };

    let mut errors = FormErrors::default();
    if state.users.find_by_username(&form.username).await?.is_some() {
        errors.add_field("username", USERNAME_TAKEN);
        return Ok(rejected(&form, &errors));
    }

    let password_hash = auth::hash_password(form.password.clone()).await?;
    let created = state
        .users
        .create(NewUser {
            username: form.username.clone(),
            password_hash,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!("Created user {} ({})", user.username, user.id);
            flash::push(&page.cookies, &Flash::success("Account created. Please log in."));
            Ok(Redirect::to(LOGIN).into_response())
        }
        // Lost a race with another signup for the same name
        Err(DatabaseError::Conflict(_)) => {
            errors.add_field("username", USERNAME_TAKEN);
            Ok(rejected(&form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

pub async fn login_form(page: Page, QueryData(query): QueryData<NextQuery>) -> View {
    let form = LoginForm {
        next: query.next.filter(|next| is_safe_next(next)),
        ..LoginForm::default()
    };
    login_view(&page, &form, &FormErrors::default())
}

/// Check credentials and start a session. Unknown usernames and wrong
/// passwords get the same answer after the same amount of work.
pub async fn login(
    State(state): State<AppState>,
    page: Page,
    FormData(form): FormData<LoginForm>,
) -> Result<Response, AppError> {
    let form = match form.clean() {
        Ok(form) => form,
        Err(Rejected { form, errors }) => {
            return Ok(login_view(&page, &form, &errors)
                .status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response());
        }
    };

    let user = state.users.find_by_username(&form.username).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = auth::verify_password(form.password.clone(), hash).await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::warn!("Failed login for {:?}", form.username);
            let mut errors = FormErrors::default();
            errors.add_form(INVALID_LOGIN);
            return Ok(login_view(&page, &form, &errors)
                .status(StatusCode::UNAUTHORIZED)
                .into_response());
        }
    };

    session::start(&page.cookies, &state.sessions, &user)?;
    tracing::info!("User {} logged in", user.username);

    let target = form
        .next
        .as_deref()
        .filter(|next| is_safe_next(next))
        .unwrap_or(HOME);
    Ok(Redirect::to(target).into_response())
}

/// Always ends anonymous, whatever the starting state.
pub async fn logout(cookies: Cookies) -> Redirect {
    session::end(&cookies);
    Redirect::to(HOME)
}
