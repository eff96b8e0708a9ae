pub mod auth;
pub mod booking;
pub mod catalog;
pub mod profile;
pub mod web;

pub use auth::auth_config;
pub use booking::booking_config;
pub use catalog::catalog_config;
pub use profile::profile_config;
pub use web::web_config;
