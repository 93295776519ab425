use std::fmt;

use crate::error::BindingFailure;

/// Correlated logging for one bind call.
///
/// Every event carries the request id and the request type, so all failures
/// of one request can be found together.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BindLog<'a> {
    request_id: &'a str,
    request_type: &'static str,
}

impl<'a> BindLog<'a> {
    pub(crate) fn new(request_id: &'a str, request_type: &'static str) -> Self {
        Self {
            request_id,
            request_type,
        }
    }

    /// Logs a single binding failure.
    pub(crate) fn failure(&self, failure: &BindingFailure) {
        tracing::debug!(
            request_id = %self.request_id,
            request_type = self.request_type,
            property = failure.property_name(),
            kind = %failure.kind(),
            "{}",
            failure.message()
        );
    }

    /// Logs the end of a bind call.
    pub(crate) fn finished(&self, failures: usize) {
        if failures == 0 {
            tracing::debug!(
                request_id = %self.request_id,
                request_type = self.request_type,
                "request bound"
            );
        } else {
            tracing::debug!(
                request_id = %self.request_id,
                request_type = self.request_type,
                failures,
                "request bound with failures"
            );
        }
    }

    /// Logs a debug-level message with the request id.
    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, request_type = self.request_type, "{}", args);
    }
}
