use crate::error::RestError;

/// Response envelope matching the `{ data, error, count }` call contract.
///
/// `error.is_some()` always implies `data.is_none()`; the constructors are
/// the only way to build one with an error.
#[derive(Debug)]
pub struct RestResponse<D> {
    /// Payload: `Vec<T>` for collections, `T` for single-row accessors.
    pub data: Option<D>,
    /// Error, if any.
    pub error: Option<RestError>,
    /// Total row count (if a count was requested and the server reported one).
    pub count: Option<i64>,
    /// HTTP status code, or 0 when no response was received.
    pub status: u16,
}

impl<D> RestResponse<D> {
    /// Successful response with data.
    pub fn ok(data: D, status: u16) -> Self {
        Self {
            data: Some(data),
            error: None,
            count: None,
            status,
        }
    }

    /// Successful response without a body (head-only requests).
    pub fn empty(status: u16) -> Self {
        Self {
            data: None,
            error: None,
            count: None,
            status,
        }
    }

    /// Error response; data is always `None`.
    pub fn error(err: RestError) -> Self {
        let status = err.status().unwrap_or(0);
        Self {
            data: None,
            error: Some(err),
            count: None,
            status,
        }
    }

    /// Attach a row count.
    pub fn with_count(mut self, count: Option<i64>) -> Self {
        self.count = count;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a Result, consuming the response.
    pub fn into_result(self) -> Result<Option<D>, RestError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }

    /// Transform the payload, keeping error, count and status.
    pub fn map<U>(self, f: impl FnOnce(D) -> U) -> RestResponse<U> {
        RestResponse {
            data: self.data.map(f),
            error: self.error,
            count: self.count,
            status: self.status,
        }
    }
}

impl<T> RestResponse<Vec<T>> {
    /// Get the first row, or None if empty.
    pub fn first(&self) -> Option<&T> {
        self.data.as_ref().and_then(|rows| rows.first())
    }

    /// Narrow a collection to its first row; zero rows is a `NoRows` error.
    ///
    /// More than one row is not an error: the server's first row wins.
    pub fn into_single(self) -> RestResponse<T> {
        self.narrow(true)
    }

    /// Narrow a collection to its first row; zero rows is `data: None`.
    pub fn into_maybe_single(self) -> RestResponse<T> {
        self.narrow(false)
    }

    fn narrow(self, require_row: bool) -> RestResponse<T> {
        if let Some(err) = self.error {
            return RestResponse {
                data: None,
                error: Some(err),
                count: self.count,
                status: self.status,
            };
        }
        let first = self.data.and_then(|rows| rows.into_iter().next());
        match first {
            Some(row) => RestResponse {
                data: Some(row),
                error: None,
                count: self.count,
                status: self.status,
            },
            None if require_row => RestResponse {
                data: None,
                error: Some(RestError::NoRows),
                count: self.count,
                status: self.status,
            },
            None => RestResponse {
                data: None,
                error: None,
                count: self.count,
                status: self.status,
            },
        }
    }
}
