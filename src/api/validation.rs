//! Input length checks shared by the services. Errors are plain strings;
//! the services wrap them in their own validation variants.

const MAX_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 255;
const MAX_STRING_LEN: usize = 250;

pub fn validate_name(name: &str) -> Result<&str, String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("Name must be {MAX_NAME_LEN} characters or less"));
    }
    Ok(name)
}

pub fn validate_email(email: &str) -> Result<&str, String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be {MAX_EMAIL_LEN} characters or less"));
    }
    if !email.contains('@') {
        return Err("Email must contain an @".to_string());
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<&str, String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    if password.len() > MAX_STRING_LEN {
        return Err(format!(
            "Password must be {MAX_STRING_LEN} characters or less"
        ));
    }
    Ok(password)
}

pub fn validate_description(description: &str) -> Result<&str, String> {
    if description.len() > MAX_STRING_LEN {
        return Err(format!(
            "Description must be {MAX_STRING_LEN} characters or less"
        ));
    }
    Ok(description)
}
