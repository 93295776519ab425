use std::any::type_name;

use crate::accessor::PropertyAccessor;
use crate::coerce::{Coercible, CoercionRegistry};

use super::SourceKind;

/// A request type whose properties can be bound from request data.
///
/// `describe` lists every writable property once, together with its binding
/// configuration. It runs once per registry and the resulting catalog is
/// cached, so it should be a plain sequence of `schema` calls.
///
/// # Examples
///
/// ```
/// use request_binder::{BindableRequest, Schema};
///
/// #[derive(Default)]
/// struct UpdateOrder {
///     id: u64,
///     api_key: String,
///     can_edit: bool,
/// }
///
/// impl BindableRequest for UpdateOrder {
///     fn describe(schema: &mut Schema<'_, Self>) {
///         schema.property("Id", |r: &mut Self, v: u64| r.id = v).bind_as("id");
///         schema
///             .property("ApiKey", |r: &mut Self, v: String| r.api_key = v)
///             .from_header_named("X-Key");
///         schema
///             .property("CanEdit", |r: &mut Self, v: bool| r.can_edit = v)
///             .has_permission("orders.edit");
///     }
/// }
/// ```
pub trait BindableRequest: Sized + 'static {
    /// Declares the bindable properties of `Self`.
    fn describe(schema: &mut Schema<'_, Self>);
}

/// Parsed binding configuration of one property.
#[derive(Debug, Clone, Default)]
pub(crate) struct BindingConfig {
    pub(crate) source: SourceKind,
    pub(crate) bind_name: Option<String>,
    pub(crate) source_key: Option<String>,
    pub(crate) required: Option<bool>,
    pub(crate) conflict: Option<(SourceKind, SourceKind)>,
}

impl BindingConfig {
    fn set_source(&mut self, source: SourceKind, key: Option<String>) {
        if self.source != SourceKind::Regular && self.source != source && self.conflict.is_none() {
            self.conflict = Some((self.source, source));
        }
        self.source = source;
        if key.is_some() {
            self.source_key = key;
        }
    }
}

pub(crate) struct SchemaEntry<R> {
    pub(crate) accessor: PropertyAccessor<R>,
    pub(crate) config: BindingConfig,
}

/// Collects the property declarations of a request type.
pub struct Schema<'r, R> {
    registry: &'r CoercionRegistry,
    entries: Vec<SchemaEntry<R>>,
}

impl<'r, R: 'static> Schema<'r, R> {
    pub(crate) fn new(registry: &'r CoercionRegistry) -> Self {
        Self {
            registry,
            entries: Vec::new(),
        }
    }

    pub(crate) fn into_entries(self) -> Vec<SchemaEntry<R>> {
        self.entries
    }

    /// Declares a writable property of type `T`.
    ///
    /// Without further configuration the property is regular: it is bound by
    /// `name` from form fields, route values and query parameters.
    pub fn property<T: Coercible>(
        &mut self,
        name: impl Into<String>,
        setter: fn(&mut R, T),
    ) -> PropertyConfig<'_> {
        let accessor = PropertyAccessor::new(name, setter, self.registry.resolve::<T>());
        self.entries.push(SchemaEntry {
            accessor,
            config: BindingConfig::default(),
        });

        let index = self.entries.len() - 1;
        PropertyConfig {
            config: &mut self.entries[index].config,
        }
    }

    /// Includes every property of an embedded request type.
    ///
    /// The embedded properties keep their own names and configuration and are
    /// assigned through `project`.
    pub fn flatten<B: BindableRequest>(&mut self, project: fn(&mut R) -> &mut B) {
        let mut inner = Schema::<B>::new(self.registry);
        B::describe(&mut inner);

        tracing::trace!(
            request_type = type_name::<R>(),
            embedded_type = type_name::<B>(),
            properties = inner.entries.len(),
            "flattening embedded request type"
        );

        self.entries
            .extend(inner.entries.into_iter().map(|entry| SchemaEntry {
                accessor: entry.accessor.flatten(project),
                config: entry.config,
            }));
    }
}

/// Binding configuration for one declared property.
///
/// Header, claim and permission sources are required unless marked
/// [`optional`](Self::optional). Configuring two different non-regular
/// sources on one property is a declaration defect reported when the catalog
/// is built.
pub struct PropertyConfig<'a> {
    config: &'a mut BindingConfig,
}

impl<'a> PropertyConfig<'a> {
    /// Binds a regular property under `name` instead of the property name.
    pub fn bind_as(self, name: impl Into<String>) -> Self {
        self.config.bind_name = Some(name.into());
        self
    }

    /// Binds from the header named after the property.
    pub fn from_header(self) -> Self {
        self.config.set_source(SourceKind::Header, None);
        self
    }

    /// Binds from the header `name`.
    pub fn from_header_named(self, name: impl Into<String>) -> Self {
        self.config.set_source(SourceKind::Header, Some(name.into()));
        self
    }

    /// Binds from the claim whose type is the property name.
    pub fn from_claim(self) -> Self {
        self.config.set_source(SourceKind::Claim, None);
        self
    }

    /// Binds from the first claim of `claim_type`.
    pub fn from_claim_type(self, claim_type: impl Into<String>) -> Self {
        self.config.set_source(SourceKind::Claim, Some(claim_type.into()));
        self
    }

    /// Binds a `bool` property to whether the principal holds `permission`.
    pub fn has_permission(self, permission: impl Into<String>) -> Self {
        self.config
            .set_source(SourceKind::Permission, Some(permission.into()));
        self
    }

    /// Sets whether a header, claim or permission source must be satisfied.
    pub fn required(self, required: bool) -> Self {
        self.config.required = Some(required);
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }
}
