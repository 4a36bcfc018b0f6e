use knob_derive::knob_error;
use std::borrow::Cow;

#[knob_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk gone")).context("Reading demo file")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading demo file): disk gone");

    let err: Result<(), DemoError> =
        Err(DemoError::Rejected { message: "bad".into(), context: None });
    let err = err.context("while testing").unwrap_err();
    assert_eq!(err.to_string(), "Rejected (while testing): bad");
}
