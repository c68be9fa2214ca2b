use automata_derive::automata_error;
use std::borrow::Cow;

#[automata_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: DemoError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: DemoError = String::from("owned").into();
    assert!(matches!(err, DemoError::Internal { .. }));

    let io = std::io::Error::other("disk");
    let err: DemoError = io.into();
    assert!(matches!(err, DemoError::Io { context: None, .. }));
}
