use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagerError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no tty"))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(matches!(err, PagerError::Io(_)));
        assert_eq!(err.to_string(), "IO error: no tty");
    }
}
