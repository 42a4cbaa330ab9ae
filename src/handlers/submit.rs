// handlers/submit.rs - GET/POST /submit/resource/ and /submit/forum/
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use super::FormData;
use crate::database::models::Content;
use crate::database::ContentRepository;
use crate::error::AppError;
use crate::forms::{CleanForm, ContentForm, FormErrors, Rejected};
use crate::middleware::{flash, Flash};
use crate::routes::HOME;
use crate::state::AppState;
use crate::views::{Page, View};

const CONTENT_FIELDS: &[&str] = &["title", "content"];

const RESOURCE_TEMPLATE: &str = "submit_resource.html";
const FORUM_POST_TEMPLATE: &str = "submit_forum_post.html";

fn form_view(page: &Page, template: &'static str, form: &ContentForm, errors: &FormErrors) -> View {
    page.view(template)
        .with("form", form)
        .with("errors", &errors.by_field(CONTENT_FIELDS))
}

/// Validate, store, then send the user home with a confirmation.
async fn create<T: Content>(
    repository: &dyn ContentRepository<T>,
    page: &Page,
    template: &'static str,
    form: ContentForm,
    confirmation: &str,
) -> Result<Response, AppError> {
    let form = match form.clean() {
        Ok(form) => form,
        Err(Rejected { form, errors }) => {
            return Ok(form_view(page, template, &form, &errors)
                .status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response());
        }
    };

    let created = repository.create(form.into()).await?;
    tracing::info!("Created {} {}: {:?}", T::LABEL, created.id(), created.title());

    flash::push(&page.cookies, &Flash::success(confirmation));
    Ok(Redirect::to(HOME).into_response())
}

pub async fn resource_form(page: Page) -> View {
    form_view(&page, RESOURCE_TEMPLATE, &ContentForm::default(), &FormErrors::default())
}

pub async fn submit_resource(
    State(state): State<AppState>,
    page: Page,
    FormData(form): FormData<ContentForm>,
) -> Result<Response, AppError> {
    create(
        state.resources.as_ref(),
        &page,
        RESOURCE_TEMPLATE,
        form,
        "Resource submitted.",
    )
    .await
}

pub async fn forum_post_form(page: Page) -> View {
    form_view(&page, FORUM_POST_TEMPLATE, &ContentForm::default(), &FormErrors::default())
}

pub async fn submit_forum_post(
    State(state): State<AppState>,
    page: Page,
    FormData(form): FormData<ContentForm>,
) -> Result<Response, AppError> {
    create(
        state.forum_posts.as_ref(),
        &page,
        FORUM_POST_TEMPLATE,
        form,
        "Forum post submitted.",
    )
    .await
}
