use once_cell::sync::Lazy;
use tera::{Context, Tera};

use super::ViewError;

/// Templates are compiled into the binary so the server never depends on
/// its working directory.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("resource_detail.html", include_str!("../../templates/resource_detail.html")),
    ("forum_post_detail.html", include_str!("../../templates/forum_post_detail.html")),
    ("submit_resource.html", include_str!("../../templates/submit_resource.html")),
    ("submit_forum_post.html", include_str!("../../templates/submit_forum_post.html")),
    ("search_results.html", include_str!("../../templates/search_results.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

static ENGINE: Lazy<Result<Tera, String>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())
        .map_err(|e| format!("{e:?}"))?;
    Ok(tera)
});

fn engine() -> Result<&'static Tera, ViewError> {
    ENGINE
        .as_ref()
        .map_err(|e| ViewError::Engine(e.clone()))
}

/// Compile every template up front; called once at startup.
pub fn check() -> Result<(), ViewError> {
    engine().map(|_| ())
}

pub fn render(name: &str, context: &Context) -> Result<String, ViewError> {
    engine()?
        .render(name, context)
        .map_err(|e| ViewError::Render {
            template: name.to_string(),
            reason: format!("{e:?}"),
        })
}
