use std::borrow::Cow;

/// A recognized failure category shared with upstream services.
///
/// The `code` is the stable string that travels on the wire in
/// [`ErrorResponse::code`](crate::ErrorResponse::code); `status` is the HTTP
/// status a service answers with when it raises this error.
///
/// Callers declare their own categories as constants and register them on the
/// client with [`HttpClient::add_error_mappings`](crate::HttpClient::add_error_mappings):
///
/// ```
/// use hz_http_client::ServiceError;
///
/// const NOT_FOUND: ServiceError = ServiceError::new("NOT_FOUND", 404);
///
/// assert_eq!(NOT_FOUND.code(), "NOT_FOUND");
/// assert_eq!(NOT_FOUND.status(), 404);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{code}")]
pub struct ServiceError {
    code: Cow<'static, str>,
    status: u16,
}

impl ServiceError {
    /// Internal failure inside the answering service.
    pub const INTERNAL: ServiceError = ServiceError::new("INTERNAL_SERVICE_ERROR", 500);
    /// The request was malformed or failed validation.
    pub const BAD_REQUEST: ServiceError = ServiceError::new("BAD_REQUEST", 400);

    pub const fn new(code: &'static str, status: u16) -> Self {
        Self {
            code: Cow::Borrowed(code),
            status,
        }
    }

    /// Builds a category whose code is only known at runtime.
    pub fn owned(code: impl Into<String>, status: u16) -> Self {
        Self {
            code: Cow::Owned(code.into()),
            status,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;

    #[test]
    fn builtin_categories_carry_code_and_status() {
        assert_eq!(ServiceError::INTERNAL.code(), "INTERNAL_SERVICE_ERROR");
        assert_eq!(ServiceError::INTERNAL.status(), 500);
        assert_eq!(ServiceError::BAD_REQUEST.code(), "BAD_REQUEST");
        assert_eq!(ServiceError::BAD_REQUEST.status(), 400);
    }

    #[test]
    fn borrowed_and_owned_codes_compare_equal() {
        assert_eq!(
            ServiceError::new("NOT_FOUND", 404),
            ServiceError::owned("NOT_FOUND".to_owned(), 404)
        );
        assert_ne!(
            ServiceError::new("NOT_FOUND", 404),
            ServiceError::new("NOT_FOUND", 410)
        );
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ServiceError::BAD_REQUEST.to_string(), "BAD_REQUEST");
    }
}
