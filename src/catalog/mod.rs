//! Per-request-type binding catalogs.
//!
//! A [`PropertyCatalog`] is built once per request type from the type's
//! [`BindableRequest::describe`] declarations. It splits the properties into
//! regular ones, looked up by key from form, route and query data, and
//! required ones, bound from headers, claims or permission checks in
//! declaration order.

mod schema;

use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub use schema::{BindableRequest, PropertyConfig, Schema};

use crate::accessor::PropertyAccessor;
use crate::coerce::CoercionRegistry;
use crate::error::CatalogError;

/// Where a property's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    /// Form fields, form files, route values and query parameters.
    #[default]
    Regular,
    /// A request header.
    Header,
    /// A claim of the authenticated principal.
    Claim,
    /// A computed permission check.
    Permission,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Header => write!(f, "header"),
            Self::Claim => write!(f, "claim"),
            Self::Permission => write!(f, "permission"),
        }
    }
}

/// How one property is bound: source, lookup key, required flag and accessor.
pub struct PropertyBindingDescriptor<R> {
    source: SourceKind,
    lookup_key: String,
    is_required: bool,
    accessor: PropertyAccessor<R>,
}

impl<R: 'static> PropertyBindingDescriptor<R> {
    /// Returns the source kind. It never changes after the catalog is built.
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Returns the key used to look the value up in its source.
    pub fn lookup_key(&self) -> &str {
        &self.lookup_key
    }

    /// Returns `true` if an absent header or claim, or a denied permission,
    /// is reported as a failure. Always `false` for regular properties.
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns the property accessor.
    pub fn accessor(&self) -> &PropertyAccessor<R> {
        &self.accessor
    }
}

/// The immutable binding description of one request type.
///
/// # Examples
///
/// ```
/// use request_binder::{BindableRequest, BindingRegistry, Schema, SourceKind};
///
/// #[derive(Default)]
/// struct Search {
///     term: String,
///     tenant: String,
/// }
///
/// impl BindableRequest for Search {
///     fn describe(schema: &mut Schema<'_, Self>) {
///         schema.property("Term", |r: &mut Self, v: String| r.term = v).bind_as("q");
///         schema
///             .property("Tenant", |r: &mut Self, v: String| r.tenant = v)
///             .from_claim_type("tenant");
///     }
/// }
///
/// let registry = BindingRegistry::new();
/// let catalog = registry.catalog::<Search>().unwrap();
///
/// assert!(catalog.regular("q").is_some());
/// assert!(catalog.regular("Term").is_none());
/// assert_eq!(catalog.required()[0].source(), SourceKind::Claim);
/// ```
pub struct PropertyCatalog<R> {
    regular: HashMap<String, PropertyBindingDescriptor<R>>,
    required: Vec<PropertyBindingDescriptor<R>>,
}

impl<R: BindableRequest> PropertyCatalog<R> {
    /// Runs `R::describe` and classifies every declared property.
    ///
    /// Declaration defects are returned as [`CatalogError`]; nothing about
    /// request data is checked here. In particular a permission property whose
    /// type is not `bool` is accepted and reported per bind instead.
    pub fn build(registry: &CoercionRegistry) -> Result<Self, CatalogError> {
        let request_type = type_name::<R>();
        let mut schema = Schema::new(registry);
        R::describe(&mut schema);

        let mut names = HashSet::new();
        let mut regular = HashMap::new();
        let mut required = Vec::new();

        for entry in schema.into_entries() {
            let name = entry.accessor.name().to_owned();
            if !names.insert(name.clone()) {
                return Err(CatalogError::DuplicateProperty {
                    request_type,
                    property: name,
                });
            }

            let config = entry.config;
            if let Some((first, second)) = config.conflict {
                return Err(CatalogError::ConflictingSources {
                    request_type,
                    property: name,
                    first,
                    second,
                });
            }

            match config.source {
                SourceKind::Regular => {
                    let key = config.bind_name.unwrap_or(name);
                    if regular.contains_key(&key) {
                        return Err(CatalogError::DuplicateKey { request_type, key });
                    }
                    regular.insert(
                        key.clone(),
                        PropertyBindingDescriptor {
                            source: SourceKind::Regular,
                            lookup_key: key,
                            is_required: false,
                            accessor: entry.accessor,
                        },
                    );
                }
                source => required.push(PropertyBindingDescriptor {
                    source,
                    lookup_key: config.source_key.unwrap_or(name),
                    is_required: config.required.unwrap_or(true),
                    accessor: entry.accessor,
                }),
            }
        }

        tracing::debug!(
            request_type,
            regular = regular.len(),
            required = required.len(),
            "built property catalog"
        );

        Ok(Self { regular, required })
    }
}

impl<R: 'static> PropertyCatalog<R> {
    /// Returns the regular descriptor bound under `key`. Keys are case-sensitive.
    pub fn regular(&self, key: &str) -> Option<&PropertyBindingDescriptor<R>> {
        self.regular.get(key)
    }

    /// Number of regular properties.
    pub fn regular_len(&self) -> usize {
        self.regular.len()
    }

    /// Header, claim and permission descriptors in declaration order.
    pub fn required(&self) -> &[PropertyBindingDescriptor<R>] {
        &self.required
    }
}

impl<R> fmt::Debug for PropertyBindingDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBindingDescriptor")
            .field("source", &self.source)
            .field("lookup_key", &self.lookup_key)
            .field("is_required", &self.is_required)
            .field("accessor", &self.accessor)
            .finish()
    }
}

impl<R> fmt::Debug for PropertyCatalog<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCatalog")
            .field("regular", &self.regular)
            .field("required", &self.required)
            .finish()
    }
}
