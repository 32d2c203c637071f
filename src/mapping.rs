use std::collections::HashMap;

use crate::{ClientError, ErrorResponse, ServiceError};

/// Lookup table from wire error code to a registered [`ServiceError`].
#[derive(Clone, Debug, Default)]
pub struct ErrorMapping {
    entries: HashMap<String, ServiceError>,
}

impl ErrorMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `code → error`; a later registration for the same code wins.
    pub fn insert(&mut self, code: impl Into<String>, error: ServiceError) {
        self.entries.insert(code.into(), error);
    }

    pub fn get(&self, code: &str) -> Option<&ServiceError> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Turns a decoded upstream payload into the error handed to the caller.
    ///
    /// Unknown codes are expected when upstream adds new ones; they fall back
    /// to [`ClientError::Unmapped`].
    pub fn resolve(&self, status: u16, payload: ErrorResponse) -> ClientError {
        match self.entries.get(&payload.code) {
            Some(error) => ClientError::Service {
                error: error.clone(),
                message: payload.message,
            },
            None => ClientError::Unmapped {
                status,
                code: payload.code,
                message: payload.message,
            },
        }
    }
}

impl<K: Into<String>> Extend<(K, ServiceError)> for ErrorMapping {
    fn extend<I: IntoIterator<Item = (K, ServiceError)>>(&mut self, iter: I) {
        for (code, error) in iter {
            self.insert(code, error);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, ServiceError)> for ErrorMapping {
    fn from_iter<I: IntoIterator<Item = (K, ServiceError)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        mapping.extend(iter);
        mapping
    }
}
