use std::sync::Arc;

use crate::cache::TypeCache;

use super::shape::Coercible;
use super::strategy::CoercionStrategy;

/// Cached outcome for one type: a strategy or the permanent unresolvable marker.
type Resolution<T> = Option<Arc<CoercionStrategy<T>>>;

/// Finds and memoizes the text-to-value strategy for each target type.
///
/// The registry is meant to live as long as the process and be shared by
/// every binder. A type's [`Coercible::shape`] is consulted at most once per
/// successful first write; later lookups only take a read lock. No lock is
/// held while user shape code runs, so a slow shape on one thread never
/// blocks another thread resolving a different type.
///
/// # Examples
///
/// ```
/// use request_binder::CoercionRegistry;
///
/// let registry = CoercionRegistry::new();
///
/// let url = registry.resolve::<url::Url>().expect("urls are resolvable");
/// assert!(url.coerce_str("https://example.com/a").is_some());
/// assert!(url.coerce_str("not a url").is_none());
/// ```
#[derive(Default)]
pub struct CoercionRegistry {
    strategies: TypeCache,
}

impl CoercionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            strategies: TypeCache::new(),
        }
    }

    /// Returns the strategy for `T`, or `None` if `T` is unresolvable.
    pub fn resolve<T: Coercible>(&self) -> Option<Arc<CoercionStrategy<T>>> {
        if let Some(cached) = self.strategies.get::<Resolution<T>>() {
            return (*cached).clone();
        }

        let resolution: Resolution<T> = CoercionStrategy::select(T::shape()).map(Arc::new);

        match &resolution {
            Some(strategy) => tracing::debug!(
                target_type = std::any::type_name::<T>(),
                source = %strategy.source(),
                "resolved coercion strategy"
            ),
            None => tracing::debug!(
                target_type = std::any::type_name::<T>(),
                "type has no coercion strategy"
            ),
        }

        (*self.strategies.insert(resolution)).clone()
    }

    /// Number of types resolved so far, including unresolvable ones.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns `true` if no type has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoercionRegistry")
            .field("resolved", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::coerce::shape::{TryFactory, TypeShape};
    use crate::coerce::strategy::StrategySource;

    static SHAPE_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, PartialEq)]
    struct Counted(String);

    impl Coercible for Counted {
        fn shape() -> TypeShape<Self> {
            SHAPE_CALLS.fetch_add(1, Ordering::SeqCst);
            TypeShape::new().try_factory(TryFactory::TryParse, |s| Some(Counted(s.to_owned())))
        }
    }

    #[derive(Debug, Clone)]
    struct Opaque;

    impl Coercible for Opaque {
        fn shape() -> TypeShape<Self> {
            TypeShape::new()
        }
    }

    #[test]
    fn strategies_are_memoized() {
        let registry = CoercionRegistry::new();

        let first = registry.resolve::<Counted>().unwrap();
        let calls = SHAPE_CALLS.load(Ordering::SeqCst);
        let second = registry.resolve::<Counted>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(SHAPE_CALLS.load(Ordering::SeqCst), calls);
        assert_eq!(second.coerce_str("a"), Some(Counted("a".into())));
    }

    #[test]
    fn unresolvable_marker_is_cached() {
        let registry = CoercionRegistry::new();

        assert!(registry.resolve::<Opaque>().is_none());
        assert!(registry.resolve::<Opaque>().is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registries_are_independent() {
        let a = CoercionRegistry::new();
        let b = CoercionRegistry::new();

        a.resolve::<u8>();
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn builtins_resolve() {
        let registry = CoercionRegistry::new();

        assert_eq!(
            registry.resolve::<String>().unwrap().source(),
            StrategySource::Text
        );
        assert_eq!(
            registry.resolve::<url::Url>().unwrap().source(),
            StrategySource::Uri
        );
    }

    #[test]
    fn concurrent_first_use_yields_one_strategy() {
        let registry = CoercionRegistry::new();

        let strategies: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.resolve::<i64>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(strategies.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }
}
