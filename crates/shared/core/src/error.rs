use std::borrow::Cow;

/// Errors raised while loading solutions or dispatching get/set calls.
///
/// Load-time kinds (`UnknownHandlerType`, `DuplicateIdentifier`, `MalformedDefinition`)
/// abort the whole load. Call-time kinds are recorded against a single entry of a batch,
/// except [`SettingsError::BackendUnavailable`], which fails the whole batch.
#[knob_derive::knob_error]
pub enum SettingsError {
    /// A group declares a handler tag that nothing registered.
    #[error("Unknown handler type{}: {message}", format_context(.context))]
    UnknownHandlerType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The same identifier appears twice in one scope.
    #[error("Duplicate identifier{}: {message}", format_context(.context))]
    DuplicateIdentifier { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The definition source does not have the expected shape.
    #[error("Malformed definition{}: {message}", format_context(.context))]
    MalformedDefinition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A fixed handler has no getter (or setter) bound to the setting id.
    #[error("No binding for setting{}: {message}", format_context(.context))]
    NoBindingForSetting { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A setter refused the value it was given.
    #[error("Setter rejected value{}: {message}", format_context(.context))]
    SetterRejectedValue { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The backend connection itself is unusable; the whole batch fails.
    #[error("Backend unavailable{}: {message}", format_context(.context))]
    BackendUnavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// One backend operation failed; only the affected entry fails.
    #[error("Backend operation failed{}: {message}", format_context(.context))]
    BackendOperation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Lookup of a solution, group or setting that does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A setting outlived the group that owns it.
    #[error("Setting detached{}: {message}", format_context(.context))]
    Detached { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

impl SettingsError {
    /// Whether this error must abort a whole batch instead of a single entry.
    #[must_use]
    pub const fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// Whether this error can only occur while loading a definition.
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownHandlerType { .. }
                | Self::DuplicateIdentifier { .. }
                | Self::MalformedDefinition { .. }
        )
    }

    pub(crate) fn not_found(what: &str, id: &str) -> Self {
        Self::NotFound { message: format!("{what} `{id}`").into(), context: None }
    }
}
