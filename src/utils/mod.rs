pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod validation;

pub use code_generator::{generate_session_key, generate_six_digit_code};
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use validation::*;
