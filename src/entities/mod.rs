pub mod bookings;
pub mod otps;
pub mod profiles;
pub mod programs;
pub mod trainers;
pub mod users;
pub mod web_sessions;

pub use bookings::PreferredTime;
pub use bookings as booking_entity;
pub use otps as otp_entity;
pub use profiles as profile_entity;
pub use programs as program_entity;
pub use trainers as trainer_entity;
pub use users as user_entity;
pub use web_sessions as web_session_entity;
