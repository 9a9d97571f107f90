use crate::error::AppError;
use crate::models::user::Role;

pub const NUMBER_LEN: usize = 11;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 256;
pub const MAX_TAG_LEN: usize = 5;

/// 空字符串视为未提供
pub fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn check_number(number: &str) -> Result<(), AppError> {
    if number.chars().count() != NUMBER_LEN {
        return Err(AppError::validation("手机号必须为11位"));
    }
    Ok(())
}

/// 只校验下限，不设上限
pub fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation("密码不能少于6位"));
    }
    Ok(())
}

pub fn check_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::validation("用户名不能为空"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation("用户名不能超过32位"));
    }
    Ok(())
}

pub fn check_address(address: &str) -> Result<(), AppError> {
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(AppError::validation("地址不能超过256位"));
    }
    Ok(())
}

pub fn check_tag(tag: &str) -> Result<(), AppError> {
    if tag.chars().count() > MAX_TAG_LEN {
        return Err(AppError::validation("标签不能超过5位"));
    }
    Ok(())
}

pub fn parse_role(role: &str) -> Result<Role, AppError> {
    role.parse().map_err(|e: crate::models::user::RoleParseError| AppError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_must_be_exactly_eleven_chars() {
        assert!(check_number("13800000000").is_ok());
        assert!(check_number("1380000000").is_err());
        assert!(check_number("138000000000").is_err());
        assert!(check_number("").is_err());
    }

    #[test]
    fn password_has_only_a_lower_bound() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
        assert!(check_password("a-very-long-password-indeed").is_ok());
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert!(check_tag("管理员用户").is_ok());
        assert!(check_tag("超级管理员用户").is_err());
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        assert_eq!(parse_role("2").unwrap(), Role::Banned);
        assert!(matches!(parse_role("admin"), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_string_counts_as_absent() {
        assert_eq!(provided(Some(String::new())), None);
        assert_eq!(provided(Some("x".into())), Some("x".into()));
        assert_eq!(provided(None), None);
    }
}
