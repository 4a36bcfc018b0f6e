use knob_core::SettingsError;
use std::borrow::Cow;

#[knob_derive::knob_error]
pub enum ProcessError {
    #[error("Process I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Delivering a signal failed for a reason other than the process being gone.
    #[cfg(target_os = "linux")]
    #[error("Signal delivery failed{}: {source}", format_context(.context))]
    Signal { source: nix::errno::Errno, context: Option<Cow<'static, str>> },

    #[error("Invalid process id{}: {message}", format_context(.context))]
    InvalidPid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The backend cannot manage processes on this platform.
    #[error("Unsupported{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ProcessError> for SettingsError {
    fn from(err: ProcessError) -> Self {
        let message = err.to_string().into();
        match err {
            ProcessError::Unsupported { .. } => Self::BackendUnavailable { message, context: None },
            _ => Self::BackendOperation { message, context: None },
        }
    }
}
