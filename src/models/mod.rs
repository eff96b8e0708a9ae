pub mod booking;
pub mod catalog;
pub mod profile;
pub mod session;
pub mod user;

pub use booking::*;
pub use catalog::*;
pub use profile::*;
pub use session::*;
pub use user::*;
