use knob_core::SettingsError;
use std::borrow::Cow;

/// Errors raised by registry backends.
#[knob_derive::knob_error]
pub enum RegistryError {
    /// The path names a root hive the backend does not have.
    #[error("Hive not found{}: {message}", format_context(.context))]
    HiveNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid key path{}: {message}", format_context(.context))]
    InvalidPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Registry store I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Registry store is not valid JSON{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl From<RegistryError> for SettingsError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string().into();
        // A group whose key cannot be opened fails every entry the same way.
        Self::BackendUnavailable { message, context: None }
    }
}
