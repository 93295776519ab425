/// An authenticated user or service principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Claims issued to this principal, in issue order
    pub claims: Vec<Claim>,
}

impl Principal {
    /// Creates a principal with no claims.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            claims: Vec::new(),
        }
    }

    /// Adds a claim.
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    /// Returns the first claim of `claim_type`. Claim types compare ignoring
    /// ASCII case.
    pub fn find_claim(&self, claim_type: &str) -> Option<&Claim> {
        self.claims
            .iter()
            .find(|claim| claim.claim_type.eq_ignore_ascii_case(claim_type))
    }

    /// Returns `true` if the principal holds a claim of `claim_type` whose
    /// value is exactly `value`.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|claim| claim.claim_type.eq_ignore_ascii_case(claim_type) && claim.value == value)
    }
}

/// A single `(type, value)` statement about a principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim {
    /// Claim type, e.g. `"sub"` or `"permission"`
    pub claim_type: String,
    /// Claim value
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_claim_returns_first_match() {
        let principal = Principal::new("u1")
            .with_claim("role", "reader")
            .with_claim("role", "writer");

        assert_eq!(principal.find_claim("role").unwrap().value, "reader");
        assert_eq!(principal.find_claim("ROLE").unwrap().value, "reader");
        assert!(principal.find_claim("tenant").is_none());
    }

    #[test]
    fn has_claim_compares_value_exactly() {
        let principal = Principal::new("u1").with_claim("permission", "CanEdit");

        assert!(principal.has_claim("permission", "CanEdit"));
        assert!(principal.has_claim("Permission", "CanEdit"));
        assert!(!principal.has_claim("permission", "canedit"));
        assert!(!principal.has_claim("role", "CanEdit"));
    }
}
