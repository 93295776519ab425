//! Owned request values for binding.

use std::sync::Arc;

use crate::accessor::{RawValue, SourceValue};
use crate::request::Principal;

use super::extract::{ClaimLookup, HeaderLookup, Headers};
use super::form::{FormData, FormFile, NamedValues};

/// A value produced by route matching.
#[derive(Debug, Clone)]
pub enum RouteValue {
    /// The matched path segment as text.
    Text(String),
    /// A value the router already converted. It is assigned as-is when the
    /// property has exactly this type, and rendered as text otherwise.
    Typed(Arc<dyn SourceValue>),
}

impl RouteValue {
    pub(crate) fn as_raw(&self) -> RawValue<'_> {
        match self {
            RouteValue::Text(text) => RawValue::Text(text),
            RouteValue::Typed(value) => RawValue::Value(value.as_ref()),
        }
    }
}

/// Everything a bind reads from one request, materialized in memory.
///
/// `RequestValues` holds simple, owned data so it stays independent of any
/// web framework. An integration fills it from its own request type, usually
/// in a `From` impl, and hands it to [`Binder::bind`](crate::Binder::bind).
///
/// # Examples
///
/// ```
/// use request_binder::{Principal, RequestValues};
///
/// let mut values = RequestValues::new("req-12345".to_string());
/// values.add_route_value("id".to_string(), "42".to_string());
/// values.add_query_param("q".to_string(), "shoes".to_string());
/// values.add_header("X-Key".to_string(), "secret".to_string());
/// values.set_principal(Some(Principal::new("user-1").with_claim("permission", "CanEdit")));
///
/// assert_eq!(values.request_id(), "req-12345");
/// assert!(values.form().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RequestValues {
    request_id: String,
    form: Option<FormData>,
    route_values: Vec<(String, RouteValue)>,
    query: NamedValues,
    headers: Headers,
    principal: Option<Principal>,
    permission_claim_type: Option<String>,
}

impl RequestValues {
    /// Creates empty request values with the given request id.
    ///
    /// The request starts without form content; adding a form field or file
    /// marks it as form-encoded.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            form: None,
            route_values: Vec::new(),
            query: NamedValues::new(),
            headers: Headers::new(),
            principal: None,
            permission_claim_type: None,
        }
    }

    /// Replaces the form content. `None` means the request is not form-encoded.
    pub fn set_form(&mut self, form: Option<FormData>) {
        self.form = form;
    }

    /// Adds a form field.
    pub fn add_form_field(&mut self, key: String, value: String) {
        self.form.get_or_insert_with(FormData::new).fields.append(key, value);
    }

    /// Adds an uploaded file.
    pub fn add_form_file(&mut self, file: FormFile) {
        self.form.get_or_insert_with(FormData::new).files.push(file);
    }

    /// Adds a textual route value.
    pub fn add_route_value(&mut self, key: String, value: String) {
        self.route_values.push((key, RouteValue::Text(value)));
    }

    /// Adds a route value the router already converted.
    pub fn add_typed_route_value<V: SourceValue>(&mut self, key: String, value: V) {
        self.route_values
            .push((key, RouteValue::Typed(Arc::new(value))));
    }

    /// Adds a query parameter.
    pub fn add_query_param(&mut self, key: String, value: String) {
        self.query.append(key, value);
    }

    /// Adds a header.
    pub fn add_header(&mut self, key: String, value: String) {
        self.headers.add(key, value);
    }

    /// Sets the authenticated principal for this request.
    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
    }

    /// Overrides the binder's permission claim type for this request.
    pub fn set_permission_claim_type(&mut self, claim_type: Option<String>) {
        self.permission_claim_type = claim_type;
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the form content, if the request is form-encoded.
    pub fn form(&self) -> Option<&FormData> {
        self.form.as_ref()
    }

    /// Returns the route values in match order.
    pub fn route_values(&self) -> &[(String, RouteValue)] {
        &self.route_values
    }

    /// Returns the query parameters.
    pub fn query(&self) -> &NamedValues {
        &self.query
    }

    /// Returns the principal, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Borrows the values as binding sources.
    pub fn sources(&self) -> BindingSources<'_> {
        BindingSources {
            request_id: &self.request_id,
            form: self.form.as_ref(),
            route_values: &self.route_values,
            query: &self.query,
            headers: &self.headers,
            claims: &self.principal,
            permission_claim_type: self.permission_claim_type.as_deref(),
        }
    }
}

/// Borrowed view of one request's inputs.
///
/// Integrations with their own header and identity types can build this
/// directly instead of copying into [`RequestValues`].
#[derive(Clone, Copy)]
pub struct BindingSources<'a> {
    /// Request id used to correlate log events.
    pub request_id: &'a str,
    /// Form content; `None` when the request is not form-encoded.
    pub form: Option<&'a FormData>,
    /// Route values in match order.
    pub route_values: &'a [(String, RouteValue)],
    /// Query parameters.
    pub query: &'a NamedValues,
    /// Header lookup.
    pub headers: &'a dyn HeaderLookup,
    /// Claim lookup on the principal.
    pub claims: &'a dyn ClaimLookup,
    /// Per-request permission claim type, taking precedence over the binder's.
    pub permission_claim_type: Option<&'a str>,
}

impl std::fmt::Debug for BindingSources<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSources")
            .field("request_id", &self.request_id)
            .field("form", &self.form)
            .field("route_values", &self.route_values)
            .field("query", &self.query)
            .field("permission_claim_type", &self.permission_claim_type)
            .finish_non_exhaustive()
    }
}
