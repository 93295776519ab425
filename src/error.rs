use std::fmt;

use crate::accessor::PropertyType;
use crate::catalog::SourceKind;

/// A single unsuccessful property assignment recorded during a bind.
///
/// Failures are value objects: they are created when a property could not be
/// produced or assigned and never change afterwards. A bind call collects every
/// failure from every phase and returns them together, so a caller can report
/// all problems with a request in one response.
///
/// # Examples
///
/// ```
/// use request_binder::{BindingFailure, FailureKind, PropertyType};
///
/// let failure = BindingFailure::new(
///     FailureKind::MissingRequiredSource,
///     "ApiKey",
///     PropertyType::of::<String>(),
///     None,
///     "The request is missing the required header X-Key.",
/// );
///
/// assert_eq!(failure.kind(), FailureKind::MissingRequiredSource);
/// assert_eq!(failure.property_name(), "ApiKey");
/// assert!(failure.raw_value().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingFailure {
    kind: FailureKind,
    property_name: String,
    property_type: PropertyType,
    raw_value: Option<String>,
    message: String,
}

impl BindingFailure {
    /// Creates a new binding failure.
    pub fn new(
        kind: FailureKind,
        property_name: impl Into<String>,
        property_type: PropertyType,
        raw_value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            property_name: property_name.into(),
            property_type,
            raw_value,
            message: message.into(),
        }
    }

    /// A strategy exists for the property's type but rejected the input.
    pub(crate) fn coercion(
        property_name: &str,
        property_type: PropertyType,
        raw_value: Option<String>,
    ) -> Self {
        let message = format!(
            "Could not bind property {} with type {} to value {}.",
            property_name,
            property_type,
            raw_value.as_deref().unwrap_or("<none>"),
        );
        Self::new(
            FailureKind::CoercionFailure,
            property_name,
            property_type,
            raw_value,
            message,
        )
    }

    /// No strategy can ever produce the property's type from text.
    pub(crate) fn unresolvable(
        property_name: &str,
        property_type: PropertyType,
        raw_value: Option<String>,
    ) -> Self {
        let message = format!(
            "Could not bind property {}: values of type {} cannot be converted from text.",
            property_name, property_type,
        );
        Self::new(
            FailureKind::UnresolvableType,
            property_name,
            property_type,
            raw_value,
            message,
        )
    }

    /// Returns the failure category.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the name of the property that could not be bound.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Returns the declared type of the property.
    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    /// Returns the raw input rendered as text, if there was one.
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Returns the human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BindingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for BindingFailure {}

/// The category of a [`BindingFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The property's type has no coercion strategy. Permanent per type.
    UnresolvableType,
    /// A strategy was found but rejected the input, returned an error or panicked.
    CoercionFailure,
    /// A required header or claim was absent from the request.
    MissingRequiredSource,
    /// The source value can never be assigned to the declared type
    /// (an uploaded file bound to a non-file property, or a permission
    /// check bound to a non-boolean property).
    TypeMismatch,
    /// A required permission claim is not held by the principal.
    PermissionDenied,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvableType => write!(f, "unresolvable type"),
            Self::CoercionFailure => write!(f, "coercion failure"),
            Self::MissingRequiredSource => write!(f, "missing required source"),
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

/// Errors raised while building a request type's property catalog.
///
/// These stem from malformed binding declarations, not from request data, so
/// they indicate a program defect. They propagate out of `bind` instead of
/// being folded into the failure list, and a failed catalog is never cached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two regular properties resolve to the same lookup key.
    #[error("request type {request_type} binds more than one property to the key `{key}`")]
    DuplicateKey {
        /// The request type being described.
        request_type: &'static str,
        /// The lookup key claimed twice.
        key: String,
    },

    /// The same property name was declared twice.
    #[error("request type {request_type} declares the property {property} more than once")]
    DuplicateProperty {
        /// The request type being described.
        request_type: &'static str,
        /// The repeated property name.
        property: String,
    },

    /// A property was configured with two different source kinds.
    #[error(
        "property {property} on {request_type} is configured as both a {first} and a {second} source"
    )]
    ConflictingSources {
        /// The request type being described.
        request_type: &'static str,
        /// The misconfigured property.
        property: String,
        /// The source kind configured first.
        first: SourceKind,
        /// The source kind configured afterwards.
        second: SourceKind,
    },
}

/// Error returned by a fallible factory such as `Parse` or `FromString`.
///
/// Strategies never surface this to callers; it only exists so factories have
/// an idiomatic way to reject input. The strategy logs it and reports a plain
/// coercion failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FactoryError {
    message: String,
}

impl FactoryError {
    /// Creates a factory error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps any displayable error, typically a `FromStr` error.
    pub fn from_display(error: impl fmt::Display) -> Self {
        Self::new(error.to_string())
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
