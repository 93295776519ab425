use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::cache::TypeCache;
use crate::catalog::{BindableRequest, PropertyCatalog};
use crate::coerce::{Coercible, CoercionRegistry, CoercionStrategy};
use crate::error::CatalogError;

/// Process-wide binding state: coercion strategies and property catalogs.
///
/// Create one registry at startup and share it (usually behind an `Arc`) with
/// every [`Binder`](crate::Binder). Both caches are filled lazily on first use
/// and never evicted. A catalog that fails to build is not cached, so the
/// declaration defect is reported again on every attempt.
///
/// # Examples
///
/// ```
/// use request_binder::BindingRegistry;
///
/// let registry = BindingRegistry::new();
/// let port = registry.resolve_coercion::<u16>().unwrap();
///
/// assert_eq!(port.coerce_str("443"), Some(443));
/// ```
#[derive(Default)]
pub struct BindingRegistry {
    coercions: CoercionRegistry,
    catalogs: TypeCache,
}

impl BindingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the coercion registry.
    pub fn coercions(&self) -> &CoercionRegistry {
        &self.coercions
    }

    /// Returns the memoized strategy for `T`, or `None` if `T` is unresolvable.
    pub fn resolve_coercion<T: Coercible>(&self) -> Option<Arc<CoercionStrategy<T>>> {
        self.coercions.resolve::<T>()
    }

    /// Returns the catalog for `R`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if `R`'s declarations are malformed.
    pub fn catalog<R: BindableRequest>(&self) -> Result<Arc<PropertyCatalog<R>>, CatalogError> {
        if let Some(catalog) = self.catalogs.get::<PropertyCatalog<R>>() {
            return Ok(catalog);
        }

        match PropertyCatalog::<R>::build(&self.coercions) {
            Ok(catalog) => Ok(self.catalogs.insert(catalog)),
            Err(err) => {
                tracing::warn!(
                    request_type = type_name::<R>(),
                    error = %err,
                    "invalid binding declarations"
                );
                Err(err)
            }
        }
    }

    /// Number of catalogs built so far.
    pub fn catalog_count(&self) -> usize {
        self.catalogs.len()
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("coercions", &self.coercions)
            .field("catalogs", &self.catalogs.len())
            .finish()
    }
}
