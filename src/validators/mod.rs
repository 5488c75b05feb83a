mod email;
mod name;

pub use email::validate_email;
pub use name::validate_workspace_name;

/// Input validation failures, mapped to HTTP 400 by the API layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    NameEmpty,
    NameTooLong,
    UnknownRole(String),
    OwnerNotAssignable,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmailEmpty => write!(f, "Email cannot be empty"),
            ValidationError::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            ValidationError::EmailInvalidFormat => write!(f, "Invalid email format"),
            ValidationError::NameEmpty => write!(f, "Workspace name cannot be empty"),
            ValidationError::NameTooLong => {
                write!(f, "Workspace name is too long (max 100 characters)")
            }
            ValidationError::UnknownRole(role) => write!(f, "Unknown role: {role}"),
            ValidationError::OwnerNotAssignable => {
                write!(f, "The owner role cannot be granted directly")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
