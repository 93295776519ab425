//! Type-driven value coercion and request binding.
//!
//! This crate turns the raw, textual inputs of an HTTP request into typed
//! request objects:
//! - **Coercion**: each target type declares how it is produced from text; the
//!   strategy is chosen once per type by a fixed precedence and memoized
//! - **Catalogs**: each request type declares its properties and where they
//!   bind from; the catalog is built once per type and cached
//! - **Binding**: form fields, form files, route values, query parameters,
//!   headers, claims and permission checks are applied in a fixed order, and
//!   every failure is collected instead of stopping at the first
//!
//! # Core Types
//!
//! - [`Coercible`] / [`TypeShape`]: how a type is produced from text
//! - [`CoercionRegistry`]: memoized [`CoercionStrategy`] per type
//! - [`BindableRequest`] / [`Schema`]: declarative property binding
//! - [`BindingRegistry`]: process-wide strategy and catalog caches
//! - [`Binder`]: applies [`RequestValues`] to a request object in place
//! - [`BindingFailure`]: one property that could not be bound
//!
//! # Examples
//!
//! ```
//! use request_binder::{
//!     BindableRequest, Binder, BinderConfig, BindingRegistry, FailureKind, Principal,
//!     RequestValues, Schema,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct EditOrder {
//!     id: u32,
//!     note: String,
//!     api_key: String,
//!     can_edit: bool,
//! }
//!
//! impl BindableRequest for EditOrder {
//!     fn describe(schema: &mut Schema<'_, Self>) {
//!         schema.property("Id", |r: &mut Self, v: u32| r.id = v).bind_as("id");
//!         schema.property("Note", |r: &mut Self, v: String| r.note = v);
//!         schema
//!             .property("ApiKey", |r: &mut Self, v: String| r.api_key = v)
//!             .from_header_named("X-Key");
//!         schema
//!             .property("CanEdit", |r: &mut Self, v: bool| r.can_edit = v)
//!             .has_permission("CanEdit");
//!     }
//! }
//!
//! let registry = Arc::new(BindingRegistry::new());
//! let binder = Binder::new(
//!     registry,
//!     BinderConfig::default().with_permission_claim_type("permission"),
//! );
//!
//! let mut values = RequestValues::new("req-123".to_string());
//! values.add_route_value("id".to_string(), "7".to_string());
//! values.add_query_param("Note".to_string(), "rush".to_string());
//! values.set_principal(Some(Principal::new("user-1")));
//!
//! let mut request = EditOrder::default();
//! let failures = binder.bind(&mut request, &values).expect("declarations are valid");
//!
//! assert_eq!(request.id, 7);
//! assert_eq!(request.note, "rush");
//! assert!(!request.can_edit);
//!
//! let kinds: Vec<_> = failures.iter().map(|f| f.kind()).collect();
//! assert_eq!(
//!     kinds,
//!     [FailureKind::MissingRequiredSource, FailureKind::PermissionDenied]
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod binder;
mod cache;
mod catalog;
mod coerce;
mod config;
mod error;
mod failures;
mod logging;
mod registry;
mod request;
mod sources;

pub use accessor::{PropertyAccessor, PropertyType, RawValue, SourceValue};
pub use binder::Binder;
pub use catalog::{
    BindableRequest, PropertyBindingDescriptor, PropertyCatalog, PropertyConfig, Schema,
    SourceKind,
};
pub use coerce::{
    Coercible, CoercionRegistry, CoercionStrategy, ConstructorFn, Enumeration, Factory, FactoryFn,
    StrategySource, TryFactory, TryFactoryFn, TypeShape,
};
pub use config::BinderConfig;
pub use error::{BindingFailure, CatalogError, FactoryError, FailureKind};
pub use registry::BindingRegistry;
pub use request::{Claim, Principal};
pub use sources::{
    BindingSources, ClaimLookup, FormData, FormFile, HeaderLookup, Headers, NamedValues,
    RequestValues, RouteValue,
};
