use rand::Rng;

/// 生成6位数字验证码
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

/// Opaque key for a server-side web session cookie.
pub fn generate_session_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
