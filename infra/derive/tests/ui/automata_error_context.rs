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

    #[error("Missing key: {key}")]
    Missing { key: String },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("disk"))
}

fn load() -> Result<(), DemoError> {
    read().context("reading settings")?;
    Ok(())
}

fn main() {
    let err = load().unwrap_err();
    assert!(err.to_string().starts_with("IO error (reading settings): "));

    let missing: Result<(), DemoError> = Err(DemoError::Missing { key: "x".to_owned() });
    let err = missing.context("ignored").unwrap_err();
    assert_eq!(err.to_string(), "Missing key: x");

    let internal: Result<(), DemoError> = Err("boom".into());
    let err = internal.context("startup").unwrap_err();
    assert_eq!(err.to_string(), "Internal error (startup): boom");
}
