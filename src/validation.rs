//! Platform constraints on chat input command names and descriptions.

use crate::errors::ValidationError;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Checks a slash command, subcommand or group name.
///
/// Names must be 1-32 characters, contain no spaces and be lowercase: at
/// least one lowercase character and no uppercase ones. A name without any
/// cased character, such as `"42"` or the empty name, is not lowercase.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.contains(' ') {
        return Err(ValidationError::NameContainsSpaces);
    }
    if !is_lowercase(name) {
        return Err(ValidationError::NameNotLowercase);
    }
    let length = name.chars().count();
    if length < 1 || length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameLength);
    }
    Ok(())
}

fn is_lowercase(name: &str) -> bool {
    name.chars().any(char::is_lowercase) && !name.chars().any(char::is_uppercase)
}

/// Checks a slash command, subcommand or group description (1-100 characters).
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let length = description.chars().count();
    if length < 1 || length > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::DescriptionLength);
    }
    Ok(())
}
