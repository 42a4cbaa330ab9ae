// handlers/forum.rs - GET/POST /forum/:post_id/
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use super::{found, FormData, Id};
use crate::database::models::{Comment, ForumPost, NewComment};
use crate::error::AppError;
use crate::forms::{CleanForm, CommentForm, FormErrors, Rejected};
use crate::routes::{forum_post_path, login_path};
use crate::state::AppState;
use crate::views::{Page, View};

const COMMENT_FIELDS: &[&str] = &["body"];

fn detail_view(
    page: &Page,
    post: &ForumPost,
    comments: &[Comment],
    form: &CommentForm,
    errors: &FormErrors,
) -> View {
    page.view("forum_post_detail.html")
        .with("post", post)
        .with("comments", comments)
        .with("form", form)
        .with("errors", &errors.by_field(COMMENT_FIELDS))
        .with("login_url", &login_path(&forum_post_path(post.id)))
}

/// The post with its comments in creation order, and a comment form for
/// logged-in users.
pub async fn forum_post_detail(
    State(state): State<AppState>,
    Id(post_id): Id,
    page: Page,
) -> Result<View, AppError> {
    let (post, comments) = tokio::try_join!(
        state.forum_posts.get_by_id(post_id),
        state.comments.for_post(post_id)
    )?;
    let post = found(post)?;

    Ok(detail_view(
        &page,
        &post,
        &comments,
        &CommentForm::default(),
        &FormErrors::default(),
    ))
}

/// Add a comment as the session user. Anonymous visitors are sent to the
/// login page and come back here afterwards.
pub async fn add_comment(
    State(state): State<AppState>,
    Id(post_id): Id,
    page: Page,
    FormData(form): FormData<CommentForm>,
) -> Result<Response, AppError> {
    let post = found(state.forum_posts.get_by_id(post_id).await?)?;
    let here = forum_post_path(post.id);

    let Some(user) = page.session.user() else {
        return Ok(Redirect::to(&login_path(&here)).into_response());
    };

    let form = match form.clean() {
        Ok(form) => form,
        Err(Rejected { form, errors }) => {
            let comments = state.comments.for_post(post.id).await?;
            return Ok(detail_view(&page, &post, &comments, &form, &errors)
                .status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response());
        }
    };

    let comment = state
        .comments
        .create(NewComment {
            post_id: post.id,
            user_id: user.id,
            body: form.body,
        })
        .await?;

    tracing::info!(
        "Comment {} added to forum post {} by {}",
        comment.id,
        post.id,
        user.username
    );

    Ok(Redirect::to(&here).into_response())
}
