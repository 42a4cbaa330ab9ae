mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_home_lists_resources_and_forum_posts() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.seed_resource("Nutrition Guide", "Eat well").await?;
    server.seed_resource("Clinic Hours", "Open daily").await?;
    server.seed_forum_post("First trimester questions", "Ask here").await?;

    let resp = server.get("/").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await?;

    let nutrition = body.find("Nutrition Guide").expect("first resource listed");
    let clinic = body.find("Clinic Hours").expect("second resource listed");
    assert!(nutrition < clinic, "resources are in id order");
    assert!(body.contains("First trimester questions"));
    Ok(())
}

#[tokio::test]
async fn test_home_with_no_content() -> Result<()> {
    let server = TestServer::spawn().await?;
    let body = server.get("/").await?.text().await?;
    assert!(body.contains("No resources yet."));
    assert!(body.contains("No forum posts yet."));
    Ok(())
}

#[tokio::test]
async fn test_resource_detail_shows_resource() -> Result<()> {
    let server = TestServer::spawn().await?;
    let resource = server.seed_resource("Nutrition Guide", "Folate matters").await?;

    let resp = server.get(&format!("/resource/{}/", resource.id)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await?;
    assert!(body.contains("Nutrition Guide"));
    assert!(body.contains("Folate matters"));
    Ok(())
}

#[tokio::test]
async fn test_missing_ids_are_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.seed_resource("Only one", "x").await?;

    for path in [
        "/resource/2/",
        "/resource/0/",
        "/resource/abc/",
        "/resource/-1/",
        "/resource/99999999999999999999/",
        "/forum/1/",
        "/forum/x/",
    ] {
        let resp = server.get(path).await?;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn test_unknown_paths_render_not_found_page() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/admin/", "/nope", "/resource/"] {
        let resp = server.get(path).await?;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        let body = resp.text().await?;
        assert!(body.contains("404 Not Found"));
    }
    Ok(())
}

#[tokio::test]
async fn test_content_is_escaped() -> Result<()> {
    let server = TestServer::spawn().await?;
    let resource = server
        .seed_resource("<script>alert(1)</script>", "<b>bold</b>")
        .await?;

    let body = server
        .get(&format!("/resource/{}/", resource.id))
        .await?
        .text()
        .await?;
    assert!(!body.contains("<script>alert(1)"));
    assert!(!body.contains("<b>bold"));
    assert!(body.contains("&lt;script&gt;"));
    Ok(())
}

#[tokio::test]
async fn test_health_reports_backend() -> Result<()> {
    let server = TestServer::spawn().await?;

    let resp = server.get("/health").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = resp.json().await?;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["backend"], "memory");
    Ok(())
}
