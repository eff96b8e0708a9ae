pub mod auth;
pub mod cors;
pub mod session;

pub use auth::{AuthMiddleware, current_user_id};
pub use cors::create_cors;
pub use session::WebSession;
