mod common;

use anyhow::Result;
use common::{location, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn test_submit_forms_render() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/submit/resource/", "/submit/forum/"] {
        let resp = server.get(path).await?;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body = resp.text().await?;
        assert!(body.contains(r#"name="title""#));
        assert!(body.contains(r#"name="content""#));
    }
    Ok(())
}

#[tokio::test]
async fn test_submit_resource_creates_one_and_redirects_home() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server
        .post_form(
            "/submit/resource/",
            &[("title", "  Nutrition Guide  "), ("content", "Eat well.")],
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));

    let resources = server.resources().await?;
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].title, "Nutrition Guide");
    assert_eq!(resources[0].content, "Eat well.");
    assert!(server.forum_posts().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_submission_flash_is_shown_once() -> Result<()> {
    let server = TestServer::spawn().await?;

    server
        .post_form("/submit/forum/", &[("title", "Hello"), ("content", "World")])
        .await?;

    let body = server.get("/").await?.text().await?;
    assert!(body.contains("Forum post submitted."));

    let body = server.get("/").await?.text().await?;
    assert!(!body.contains("Forum post submitted."));
    Ok(())
}

#[tokio::test]
async fn test_invalid_submission_is_rerendered() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server
        .post_form("/submit/resource/", &[("title", "   "), ("content", "kept body")])
        .await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await?;
    assert!(body.contains("This field is required."));
    assert!(body.contains("kept body"));

    assert!(server.resources().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_title_length_limit() -> Result<()> {
    let server = TestServer::spawn().await?;
    let long_title = "t".repeat(201);

    let resp = server
        .post_form("/submit/forum/", &[("title", long_title.as_str()), ("content", "body")])
        .await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await?.contains("Ensure this value has at most 200 characters."));
    assert!(server.forum_posts().await?.is_empty());

    let title = "t".repeat(200);
    let resp = server
        .post_form("/submit/forum/", &[("title", title.as_str()), ("content", "body")])
        .await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(server.forum_posts().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_fields_are_validation_errors() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server.post_form("/submit/resource/", &[]).await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(server.resources().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_null_characters_are_validation_errors() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server
        .post_form("/submit/resource/", &[("title", "a\0b"), ("content", "Eat well.")])
        .await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await?.contains("Null characters are not allowed."));
    assert!(server.resources().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_non_form_body_renders_bad_request_page() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server
        .client
        .post(server.url("/submit/resource/"))
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body("title=Nutrition&content=Eat")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(resp.text().await?.contains("The submitted form could not be read."));
    assert!(server.resources().await?.is_empty());
    Ok(())
}
