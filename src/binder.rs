use std::any::type_name;
use std::sync::Arc;

use crate::accessor::{PropertyAccessor, PropertyType, RawValue};
use crate::catalog::{BindableRequest, PropertyBindingDescriptor, PropertyCatalog, SourceKind};
use crate::coerce::Coercible;
use crate::config::BinderConfig;
use crate::error::{BindingFailure, CatalogError, FailureKind};
use crate::failures::{FailureCollection, FailurePool};
use crate::logging::BindLog;
use crate::registry::BindingRegistry;
use crate::sources::{BindingSources, FormFile, RequestValues};

/// Applies request values to request objects.
///
/// A bind runs a fixed sequence of phases against the request type's
/// catalog:
///
/// 1. form fields, only when the request is form-encoded
/// 2. form files
/// 3. route values
/// 4. query parameters
/// 5. header, claim and permission properties, in declaration order
///
/// Regular properties are re-assigned by every phase that carries their key,
/// so the last phase wins. Keys that match no property are ignored. Every
/// failure from every phase is collected; binding never stops early.
///
/// A `Binder` is cheap to share across threads. Binds only read the shared
/// registry after the first use of each type.
///
/// # Examples
///
/// ```
/// use request_binder::{BindableRequest, Binder, RequestValues, Schema};
///
/// #[derive(Default)]
/// struct GetOrder {
///     id: u32,
///     expand: bool,
/// }
///
/// impl BindableRequest for GetOrder {
///     fn describe(schema: &mut Schema<'_, Self>) {
///         schema.property("Id", |r: &mut Self, v: u32| r.id = v).bind_as("id");
///         schema.property("Expand", |r: &mut Self, v: bool| r.expand = v);
///     }
/// }
///
/// let binder = Binder::default();
///
/// let mut values = RequestValues::new("req-1".to_string());
/// values.add_route_value("id".to_string(), "42".to_string());
/// values.add_query_param("Expand".to_string(), "true".to_string());
///
/// let mut request = GetOrder::default();
/// let failures = binder.bind(&mut request, &values).unwrap();
///
/// assert!(failures.is_empty());
/// assert_eq!(request.id, 42);
/// assert!(request.expand);
/// ```
#[derive(Debug)]
pub struct Binder {
    registry: Arc<BindingRegistry>,
    config: BinderConfig,
    failures: FailurePool,
}

impl Binder {
    /// Creates a binder over a shared registry.
    pub fn new(registry: Arc<BindingRegistry>, config: BinderConfig) -> Self {
        let failures = FailurePool::new(config.pool_size, config.max_pooled_capacity);
        Self {
            registry,
            config,
            failures,
        }
    }

    /// Returns the shared registry.
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    /// Returns the binder's configuration.
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Binds `values` into `request` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] only when `R`'s binding declarations are
    /// malformed. Problems with the request data are returned in the `Ok`
    /// list instead.
    pub fn bind<R: BindableRequest>(
        &self,
        request: &mut R,
        values: &RequestValues,
    ) -> Result<Vec<BindingFailure>, CatalogError> {
        self.bind_sources(request, &values.sources())
    }

    /// Binds borrowed request inputs into `request` in place.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind).
    pub fn bind_sources<R: BindableRequest>(
        &self,
        request: &mut R,
        sources: &BindingSources<'_>,
    ) -> Result<Vec<BindingFailure>, CatalogError> {
        let catalog = self.registry.catalog::<R>()?;
        let log = BindLog::new(sources.request_id, type_name::<R>());

        let mut pass = BindPass {
            catalog: &catalog,
            request,
            failures: self.failures.collection(),
            log,
        };

        match sources.form {
            Some(form) => {
                for (key, value) in form.fields.iter_first() {
                    pass.bind_regular(key, RawValue::Text(value));
                }
                for file in &form.files {
                    pass.bind_file(file);
                }
            }
            None => log.debug(format_args!("request is not form-encoded")),
        }

        for (key, value) in sources.route_values {
            pass.bind_regular(key, value.as_raw());
        }

        for (key, value) in sources.query.iter_first() {
            pass.bind_regular(key, RawValue::Text(value));
        }

        let permission_claim_type = sources
            .permission_claim_type
            .or(self.config.permission_claim_type.as_deref());

        for descriptor in catalog.required() {
            let key = descriptor.lookup_key();
            match descriptor.source() {
                SourceKind::Header => {
                    pass.bind_required(descriptor, "header", sources.headers.header(key))
                }
                SourceKind::Claim => {
                    pass.bind_required(descriptor, "claim", sources.claims.find_claim(key))
                }
                SourceKind::Permission => match permission_claim_type {
                    Some(claim_type) => {
                        let granted = sources.claims.has_claim(claim_type, key);
                        pass.bind_permission(descriptor, granted);
                    }
                    None => log.debug(format_args!(
                        "no permission claim type configured, skipping {}",
                        descriptor.accessor().name()
                    )),
                },
                // The catalog keeps regular properties out of the required list.
                SourceKind::Regular => {}
            }
        }

        let failures = pass.failures.finish();
        log.finished(failures.len());
        Ok(failures)
    }

    /// Converts a single value outside of a request object, such as a lone
    /// route parameter.
    ///
    /// # Errors
    ///
    /// Returns an `UnresolvableType` failure if `T` cannot be produced from
    /// text, or a `CoercionFailure` if `raw` was rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_binder::{Binder, FailureKind};
    ///
    /// let binder = Binder::default();
    ///
    /// assert_eq!(binder.bind_value::<u64>("id", "17").unwrap(), 17);
    ///
    /// let failure = binder.bind_value::<u64>("id", "abc").unwrap_err();
    /// assert_eq!(failure.kind(), FailureKind::CoercionFailure);
    /// ```
    pub fn bind_value<T: Coercible>(&self, name: &str, raw: &str) -> Result<T, BindingFailure> {
        let property_type = PropertyType::of::<T>();
        let Some(strategy) = self.registry.resolve_coercion::<T>() else {
            return Err(BindingFailure::unresolvable(
                name,
                property_type,
                Some(raw.to_owned()),
            ));
        };

        strategy
            .coerce_str(raw)
            .ok_or_else(|| BindingFailure::coercion(name, property_type, Some(raw.to_owned())))
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new(Arc::new(BindingRegistry::new()), BinderConfig::default())
    }
}

/// State of one bind call.
struct BindPass<'a, 'p, R> {
    catalog: &'a PropertyCatalog<R>,
    request: &'a mut R,
    failures: FailureCollection<'p>,
    log: BindLog<'a>,
}

impl<R: BindableRequest> BindPass<'_, '_, R> {
    fn fail(&mut self, failure: BindingFailure) {
        self.log.failure(&failure);
        self.failures.push(failure);
    }

    fn bind_regular(&mut self, key: &str, raw: RawValue<'_>) {
        if let Some(descriptor) = self.catalog.regular(key) {
            self.assign(descriptor.accessor(), raw);
        }
    }

    fn assign(&mut self, accessor: &PropertyAccessor<R>, raw: RawValue<'_>) {
        if accessor.try_parse_and_set(self.request, Some(raw)) {
            return;
        }

        let rendered = Some(raw.render().into_owned());
        let failure = if accessor.can_coerce() {
            BindingFailure::coercion(accessor.name(), accessor.property_type(), rendered)
        } else {
            BindingFailure::unresolvable(accessor.name(), accessor.property_type(), rendered)
        };
        self.fail(failure);
    }

    fn bind_file(&mut self, file: &FormFile) {
        let Some(descriptor) = self.catalog.regular(&file.name) else {
            return;
        };

        let accessor = descriptor.accessor();
        if accessor.can_set_value_directly::<FormFile>()
            && accessor.set_value_directly(self.request, file.clone())
        {
            return;
        }

        self.fail(BindingFailure::new(
            FailureKind::TypeMismatch,
            accessor.name(),
            accessor.property_type(),
            None,
            "Form files can only be bound to properties of type FormFile.",
        ));
    }

    fn bind_required(
        &mut self,
        descriptor: &PropertyBindingDescriptor<R>,
        source: &str,
        value: Option<&str>,
    ) {
        let accessor = descriptor.accessor();
        match value {
            Some(value) => self.assign(accessor, RawValue::Text(value)),
            None if descriptor.is_required() => self.fail(BindingFailure::new(
                FailureKind::MissingRequiredSource,
                accessor.name(),
                accessor.property_type(),
                None,
                format!(
                    "The request is missing the required {} {}.",
                    source,
                    descriptor.lookup_key()
                ),
            )),
            None => {}
        }
    }

    fn bind_permission(&mut self, descriptor: &PropertyBindingDescriptor<R>, granted: bool) {
        let accessor = descriptor.accessor();
        if !accessor.set_value_directly(self.request, granted) {
            self.fail(BindingFailure::new(
                FailureKind::TypeMismatch,
                accessor.name(),
                accessor.property_type(),
                None,
                "Only properties of type bool can be bound from a permission check.",
            ));
            return;
        }

        if !granted && descriptor.is_required() {
            self.fail(BindingFailure::new(
                FailureKind::PermissionDenied,
                accessor.name(),
                accessor.property_type(),
                None,
                format!("User is lacking the {} permission.", descriptor.lookup_key()),
            ));
        }
    }
}
