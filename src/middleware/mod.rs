pub mod flash;
pub mod session;

pub use flash::Flash;
pub use session::{Session, SessionUser, SESSION_COOKIE};
