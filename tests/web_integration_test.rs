//! Integration tests for the framework-facing binding surface.
//!
//! These tests plug in framework-owned header and identity types through the
//! lookup traits, bind typed route values, and share one binder across
//! threads.

use std::collections::HashMap;
use std::sync::Arc;

use request_binder::{
    BindableRequest, Binder, BinderConfig, BindingRegistry, BindingSources, ClaimLookup,
    Coercible, Enumeration, FailureKind, HeaderLookup, NamedValues, Principal, RequestValues,
    RouteValue, Schema, TypeShape,
};
use url::Url;

/// A framework's own header map.
struct FrameworkHeaders(HashMap<String, Vec<String>>);

impl HeaderLookup for FrameworkHeaders {
    fn header(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// A framework's own identity type.
struct FrameworkUser {
    roles: Vec<(String, String)>,
}

impl ClaimLookup for FrameworkUser {
    fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.roles
            .iter()
            .find(|(kind, _)| kind.eq_ignore_ascii_case(claim_type))
            .map(|(_, value)| value.as_str())
    }

    fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.roles
            .iter()
            .any(|(kind, held)| kind.eq_ignore_ascii_case(claim_type) && held == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Priority {
    #[default]
    Low = 1,
    High = 5,
}

impl Enumeration for Priority {
    const VARIANTS: &'static [Self] = &[Priority::Low, Priority::High];

    fn name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::High => "High",
        }
    }

    fn discriminant(&self) -> i64 {
        *self as i64
    }
}

impl Coercible for Priority {
    fn shape() -> TypeShape<Self> {
        TypeShape::enumeration()
    }
}

/// Fields shared by every ticket request.
#[derive(Debug, Default)]
struct TicketBase {
    tenant: String,
    trace: Option<String>,
}

impl BindableRequest for TicketBase {
    fn describe(schema: &mut Schema<'_, Self>) {
        schema
            .property("Tenant", |r: &mut Self, v: String| r.tenant = v)
            .from_claim_type("tenant");
        schema
            .property("Trace", |r: &mut Self, v: String| r.trace = Some(v))
            .from_header_named("X-Trace")
            .optional();
    }
}

#[derive(Debug, Default)]
struct UpdateTicket {
    base: TicketBase,
    id: u64,
    priority: Priority,
    callback: Option<Url>,
    can_close: bool,
}

impl BindableRequest for UpdateTicket {
    fn describe(schema: &mut Schema<'_, Self>) {
        schema.flatten(|r: &mut Self| &mut r.base);
        schema.property("Id", |r: &mut Self, v: u64| r.id = v).bind_as("id");
        schema.property("Priority", |r: &mut Self, v: Priority| r.priority = v);
        schema.property("Callback", |r: &mut Self, v: Url| r.callback = Some(v));
        schema
            .property("CanClose", |r: &mut Self, v: bool| r.can_close = v)
            .has_permission("tickets.close")
            .optional();
    }
}

#[test]
fn framework_types_plug_in_through_lookup_traits() {
    let headers = FrameworkHeaders(HashMap::from([(
        "x-trace".to_string(),
        vec!["abc123".to_string(), "ignored".to_string()],
    )]));
    let user = FrameworkUser {
        roles: vec![
            ("tenant".to_string(), "acme".to_string()),
            ("scope".to_string(), "tickets.close".to_string()),
        ],
    };
    let route_values = vec![("id".to_string(), RouteValue::Text("981".to_string()))];
    let query: NamedValues = [
        ("Priority", "High"),
        ("Callback", "https://hooks.example.com/t/981"),
    ]
    .into_iter()
    .collect();

    let sources = BindingSources {
        request_id: "req-web-001",
        form: None,
        route_values: &route_values,
        query: &query,
        headers: &headers,
        claims: &user,
        permission_claim_type: Some("scope"),
    };

    let binder = Binder::default();
    let mut request = UpdateTicket::default();
    let failures = binder.bind_sources(&mut request, &sources).unwrap();

    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
    assert_eq!(request.base.tenant, "acme");
    assert_eq!(request.base.trace.as_deref(), Some("abc123"));
    assert_eq!(request.id, 981);
    assert_eq!(request.priority, Priority::High);
    assert_eq!(
        request.callback.as_ref().map(Url::as_str),
        Some("https://hooks.example.com/t/981")
    );
    assert!(request.can_close);
}

#[test]
fn enumerations_accept_names_and_discriminants() {
    let binder = Binder::default();

    assert_eq!(binder.bind_value::<Priority>("Priority", "High").unwrap(), Priority::High);
    assert_eq!(binder.bind_value::<Priority>("Priority", "5").unwrap(), Priority::High);
    assert_eq!(binder.bind_value::<Priority>("Priority", " 1 ").unwrap(), Priority::Low);
    assert_eq!(
        binder.bind_value::<Priority>("Priority", "Urgent").unwrap_err().kind(),
        FailureKind::CoercionFailure
    );
}

#[test]
fn invalid_uri_is_a_coercion_failure() {
    let mut values = RequestValues::new("req-web-002".to_string());
    values.add_query_param("Callback".to_string(), "not a url".to_string());
    values.set_principal(Some(Principal::new("u").with_claim("tenant", "acme")));

    let binder = Binder::default();
    let mut request = UpdateTicket::default();
    let failures = binder.bind(&mut request, &values).unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind(), FailureKind::CoercionFailure);
    assert_eq!(failures[0].property_name(), "Callback");
    assert_eq!(failures[0].raw_value(), Some("not a url"));
    assert!(request.callback.is_none());
}

#[test]
fn typed_route_values_are_assigned_directly_or_rendered() {
    let mut values = RequestValues::new("req-web-003".to_string());
    values.add_typed_route_value("id".to_string(), 77u64);
    values.add_typed_route_value("Priority".to_string(), 5i32);
    values.set_principal(Some(Principal::new("u").with_claim("tenant", "acme")));

    let binder = Binder::default();
    let mut request = UpdateTicket::default();
    let failures = binder.bind(&mut request, &values).unwrap();

    assert!(failures.is_empty());
    assert_eq!(request.id, 77);
    assert_eq!(request.priority, Priority::High);
}

#[test]
fn concurrent_binds_share_catalog_and_strategies() {
    let registry = Arc::new(BindingRegistry::new());
    let binder = Binder::new(
        Arc::clone(&registry),
        BinderConfig::default().with_permission_claim_type("permission"),
    );

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16u64)
            .map(|i| {
                let binder = &binder;
                scope.spawn(move || {
                    let mut values = RequestValues::new(format!("req-thread-{}", i));
                    values.add_route_value("id".to_string(), i.to_string());
                    if i % 2 == 0 {
                        values.set_principal(Some(
                            Principal::new("u").with_claim("tenant", "acme"),
                        ));
                    }

                    let mut request = UpdateTicket::default();
                    let failures = binder.bind(&mut request, &values).unwrap();
                    (i, request.id, failures.len())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, id, failure_count) in results {
        assert_eq!(id, i);
        assert_eq!(failure_count, if i % 2 == 0 { 0 } else { 1 });
    }
    assert_eq!(registry.catalog_count(), 1);
}
