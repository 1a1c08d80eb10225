/// All errors that can surface from a restbase call.
///
/// Query execution never returns these through `Err`: they travel inside
/// [`RestResponse::error`](crate::RestResponse) instead.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// The request never produced an HTTP response (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("PostgREST error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("no rows found")]
    NoRows,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Query builder error: {0}")]
    QueryBuilder(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Realtime error: {0}")]
    Realtime(String),
}

impl RestError {
    pub fn query_builder(msg: impl Into<String>) -> Self {
        Self::QueryBuilder(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Server error carrying only a status and message.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    /// The human-readable message callers render (`error.message`).
    ///
    /// For server errors this is the server's own message, without the
    /// status prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::Http(msg)
            | Self::Serialization(msg)
            | Self::QueryBuilder(msg)
            | Self::Config(msg)
            | Self::Realtime(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status attached to the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// PostgREST error code (e.g. `"PGRST116"`, `"23505"`).
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias using RestError.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_has_no_status_prefix() {
        let err = RestError::server(409, "duplicate key");
        assert_eq!(err.message(), "duplicate key");
        assert_eq!(err.to_string(), "PostgREST error (409): duplicate key");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn no_rows_message() {
        assert_eq!(RestError::NoRows.message(), "no rows found");
        assert_eq!(RestError::NoRows.status(), None);
    }

    #[test]
    fn code_only_on_server_errors() {
        let err = RestError::Server {
            status: 400,
            message: "bad".into(),
            code: Some("22P02".into()),
            details: None,
            hint: None,
        };
        assert_eq!(err.code(), Some("22P02"));
        assert_eq!(RestError::Http("refused".into()).code(), None);
    }

    #[test]
    fn from_serde_json_error() {
        let e = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: RestError = e.into();
        assert!(matches!(err, RestError::Serialization(_)));
    }
}
