pub mod mailer;
pub mod media_storage;
pub mod notification;
pub mod twilio;

pub use mailer::*;
pub use media_storage::*;
pub use notification::*;
pub use twilio::*;
