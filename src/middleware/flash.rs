use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};

const FLASH_COOKIE_NAME: &str = "_flash";

/// One-shot status message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success".to_owned(),
            message: message.into(),
        }
    }
}

pub fn push(cookies: &Cookies, flash: &Flash) {
    let Ok(json) = serde_json::to_string(flash) else {
        return;
    };

    // JSON is not a valid cookie value on its own
    let mut cookie = Cookie::new(FLASH_COOKIE_NAME, urlencoding::encode(&json).into_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

/// Read and clear the pending message.
pub fn take(cookies: &Cookies) -> Option<Flash> {
    let value = cookies.get(FLASH_COOKIE_NAME)?.value().to_owned();

    let mut removal = Cookie::new(FLASH_COOKIE_NAME, "");
    removal.set_path("/");
    cookies.remove(removal);

    let json = urlencoding::decode(&value).ok()?;
    serde_json::from_str(&json).ok()
}
