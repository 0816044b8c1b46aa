use thiserror::Error;

/// Validation failures raised by the write-side repositories.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlogError {
    #[error("invalid slug '{0}': must be 1-200 characters, lowercase letters, numbers, and hyphens only")]
    InvalidSlug(String),
    #[error("post title must be 1-{max} characters")]
    InvalidPostTitle { max: usize },
    #[error("tag title cannot be empty")]
    EmptyTagTitle,
    #[error("tag title '{title}' is longer than {max} characters")]
    TagTitleTooLong { title: String, max: usize },
    #[error("user '{0}' is not staff and cannot author posts")]
    AuthorNotStaff(String),
    #[error("invalid username '{0}'")]
    InvalidUsername(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("unknown post: {0}")]
    UnknownPost(String),
}
