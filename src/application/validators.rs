use validator::ValidateEmail;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt only looks at the first 72 bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const NAME_MAX_LEN: usize = 50;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

pub fn is_valid_username(username: &str) -> bool {
    let len = username.trim().chars().count();
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len)
}

pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(format!(
            "Password must be at most {PASSWORD_MAX_BYTES} bytes"
        ));
    }
    Ok(())
}

pub fn check_name(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > NAME_MAX_LEN => Err(format!(
            "{field} must be at most {NAME_MAX_LEN} characters"
        )),
        _ => Ok(()),
    }
}

pub fn check_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: Option<T>,
    min: T,
    max: T,
) -> Result<(), String> {
    match value {
        Some(v) if v < min || v > max => Err(format!("{field} must be between {min} and {max}")),
        _ => Ok(()),
    }
}
