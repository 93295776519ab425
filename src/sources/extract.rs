//! Lookup traits at the boundary with the hosting framework.
//!
//! The binder never sees framework header maps or identity objects. It asks
//! these traits instead, so an integration only has to implement them for its
//! own request types.

use crate::request::Principal;

/// Header-by-name lookup.
///
/// # Examples
///
/// ```
/// use request_binder::HeaderLookup;
/// use std::collections::HashMap;
///
/// struct FrameworkHeaders(HashMap<String, String>);
///
/// impl HeaderLookup for FrameworkHeaders {
///     fn header(&self, name: &str) -> Option<&str> {
///         self.0
///             .iter()
///             .find(|(key, _)| key.eq_ignore_ascii_case(name))
///             .map(|(_, value)| value.as_str())
///     }
/// }
/// ```
pub trait HeaderLookup {
    /// Returns the first value of the header `name`, if present.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Claim lookup on the authenticated principal.
pub trait ClaimLookup {
    /// Returns the value of the first claim of `claim_type`, if any.
    fn find_claim(&self, claim_type: &str) -> Option<&str>;

    /// Returns `true` if a claim of `claim_type` with exactly `value` is held.
    fn has_claim(&self, claim_type: &str, value: &str) -> bool;
}

/// Request headers with case-insensitive names.
///
/// A header may be added more than once; lookups return the first value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Number of header values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HeaderLookup for Headers {
    fn header(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl ClaimLookup for Principal {
    fn find_claim(&self, claim_type: &str) -> Option<&str> {
        Principal::find_claim(self, claim_type).map(|claim| claim.value.as_str())
    }

    fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        Principal::has_claim(self, claim_type, value)
    }
}

// An unauthenticated request holds no claims.
impl<C: ClaimLookup> ClaimLookup for Option<C> {
    fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.as_ref()?.find_claim(claim_type)
    }

    fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.as_ref()
            .is_some_and(|claims| claims.has_claim(claim_type, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_ignore_case() {
        let mut headers = Headers::new();
        headers.add("X-Key", "first");
        headers.add("x-key", "second");

        assert_eq!(headers.header("x-KEY"), Some("first"));
        assert_eq!(headers.header("X-Other"), None);
    }

    #[test]
    fn missing_principal_has_no_claims() {
        let principal: Option<Principal> = None;

        assert_eq!(ClaimLookup::find_claim(&principal, "sub"), None);
        assert!(!ClaimLookup::has_claim(&principal, "permission", "CanEdit"));
    }

    #[test]
    fn principal_claims_are_visible() {
        let principal = Some(Principal::new("u1").with_claim("sub", "u1"));

        assert_eq!(ClaimLookup::find_claim(&principal, "sub"), Some("u1"));
        assert!(ClaimLookup::has_claim(&principal, "SUB", "u1"));
    }
}
