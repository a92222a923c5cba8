use serde_json::Value;

/// Mapping errors.
///
/// The first five variants describe bad input data. The rest are caller or
/// configuration mistakes and transport failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing property '{path}'{}.", of_type(.expected))]
    MissingProperty { path: String, expected: Option<String> },

    #[error("Expected '{path}' to be '{expected}' found: {actual}")]
    IncorrectType { path: String, expected: String, actual: Value },

    #[error("Unsupported type '{ty}' for property '{path}'{}", reason_suffix(.reason))]
    UnsupportedType { path: String, ty: String, reason: Option<String> },

    #[error(
        "Invalid backing value for enum '{enum_type}' expected: type '{backing}' ({}) found: {actual}",
        .options.join(", ")
    )]
    InvalidEnumBacking { enum_type: String, backing: String, options: Vec<String>, actual: Value },

    #[error("Unsupported input object '{ty}'{}", reason_suffix(.reason))]
    UnsupportedInputObject { ty: String, reason: Option<String> },

    #[error("Type '{0}' does not exist.")]
    UnknownType(String),

    #[error("Field '{path}' declares neither a type nor a codec and cannot be mapped.")]
    Unmappable { path: String },

    #[error("invalid declaration: {0}")]
    Declaration(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn of_type(expected: &Option<String>) -> String {
    expected.as_ref().map(|ty| format!(" of type '{ty}'")).unwrap_or_default()
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default()
}

impl Error {
    pub fn missing(path: impl Into<String>, expected: Option<String>) -> Self {
        Error::MissingProperty { path: path.into(), expected }
    }

    pub fn incorrect_type(path: impl Into<String>, expected: impl Into<String>, actual: Value) -> Self {
        Error::IncorrectType { path: path.into(), expected: expected.into(), actual }
    }

    pub fn unsupported_type(path: impl Into<String>, ty: impl Into<String>, reason: Option<&str>) -> Self {
        Error::UnsupportedType { path: path.into(), ty: ty.into(), reason: reason.map(str::to_string) }
    }

    pub fn unsupported_input(ty: impl Into<String>, reason: Option<&str>) -> Self {
        Error::UnsupportedInputObject { ty: ty.into(), reason: reason.map(str::to_string) }
    }

    /// The input was wrong, as opposed to the program or its declarations.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::MissingProperty { .. }
                | Error::IncorrectType { .. }
                | Error::UnsupportedType { .. }
                | Error::InvalidEnumBacking { .. }
                | Error::UnsupportedInputObject { .. }
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::UnknownType(_) | Error::Unmappable { .. } | Error::Declaration(_))
    }

    /// Where in the input the error was found, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::MissingProperty { path, .. }
            | Error::IncorrectType { path, .. }
            | Error::UnsupportedType { path, .. }
            | Error::Unmappable { path } => Some(path),
            _ => None,
        }
    }
}
