use thiserror::Error;

/// Errors that can arise while managing item limits.
#[derive(Debug, Error)]
pub enum LimitError {
    /// Wrapper around IO errors (data directory creation, limits file access).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The limits file is not valid TOML.
    #[error("parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// The registry could not be serialized.
    #[error("serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// An administrative input named an unknown item or the "no item" sentinel.
    #[error("invalid item: {0}")]
    InvalidItemType(String),

    /// A requested cap is negative, not a number, or above the configured maximum.
    #[error("quantity {value} out of range (0-{max})")]
    OutOfRangeQuantity { value: String, max: u32 },

    /// The item has no registered limit.
    #[error("not limited: {0}")]
    NotLimited(String),

    /// A list page that is not a number or past the last page.
    #[error("invalid page: {0}")]
    InvalidPage(String),

    /// Sender lacks the administrator permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Structurally valid file with unusable content.
    #[error("malformed limits data: {0}")]
    Malformed(String),
}
