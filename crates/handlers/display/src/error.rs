use knob_core::SettingsError;
use std::borrow::Cow;

#[knob_derive::knob_error]
pub enum DisplayError {
    /// No display is attached; every call fails until one is.
    #[error("Display not attached{}: {message}", format_context(.context))]
    NotAttached { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported display mode{}: {message}", format_context(.context))]
    UnsupportedMode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported zoom level{}: {message}", format_context(.context))]
    UnsupportedZoom { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid resolution{}: {message}", format_context(.context))]
    InvalidResolution { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<DisplayError> for SettingsError {
    fn from(err: DisplayError) -> Self {
        let message = err.to_string().into();
        match err {
            DisplayError::NotAttached { .. } => Self::BackendUnavailable { message, context: None },
            _ => Self::SetterRejectedValue { message, context: None },
        }
    }
}
