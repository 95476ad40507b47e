#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("process listing failed: {0}")]
    Execution(String),

    #[error("unparseable process table: {0}")]
    Parse(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("invalid argument: {context} (got {value})")]
    InvalidArgument { context: String, value: String },
}

impl Error {
    pub(crate) fn execution<S: Into<String>>(msg: S) -> Self {
        Error::Execution(msg.into())
    }

    pub(crate) fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    pub(crate) fn notification<S: Into<String>>(msg: S) -> Self {
        Error::Notification(msg.into())
    }

    pub(crate) fn invalid_argument<C: Into<String>, V: Into<String>>(context: C, value: V) -> Self {
        Error::InvalidArgument {
            context: context.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
