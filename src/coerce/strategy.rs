use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use super::shape::{Builtin, ConstructorFn, Factory, FactoryFn, TryFactory, TypeShape};

/// Which rule produced a [`CoercionStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategySource {
    /// Text passthrough.
    Text,
    /// Generic enumeration parsing.
    Enumeration,
    /// URI construction.
    Uri,
    /// A `TryParse`/`TryCreate`/`TryDeserialize` factory.
    TryFactory(TryFactory),
    /// A `FromString`/`Parse`/`Create`/`Deserialize` factory.
    Factory(Factory),
    /// A single-text-argument constructor.
    Constructor,
}

impl fmt::Display for StrategySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text passthrough"),
            Self::Enumeration => write!(f, "enumeration"),
            Self::Uri => write!(f, "uri"),
            Self::TryFactory(name) => write!(f, "{}", name),
            Self::Factory(name) => write!(f, "{}", name),
            Self::Constructor => write!(f, "constructor"),
        }
    }
}

enum Invoke<T> {
    Total(fn(&str) -> T),
    Try(fn(&str) -> Option<T>),
    Fallible(FactoryFn<T>),
    Constructor(ConstructorFn<T>),
}

/// A memoized conversion from text to `T`.
///
/// Strategies are selected once per type and never change afterwards.
/// Invoking one never panics and never returns an error to the caller: a
/// rejected input, a factory error and a factory panic all come back as `None`.
///
/// # Examples
///
/// ```
/// use request_binder::{CoercionRegistry, StrategySource, TryFactory};
///
/// let registry = CoercionRegistry::new();
/// let strategy = registry.resolve::<u16>().expect("integers are resolvable");
///
/// assert_eq!(strategy.source(), StrategySource::TryFactory(TryFactory::TryParse));
/// assert_eq!(strategy.coerce(Some("8080")), Some(8080));
/// assert_eq!(strategy.coerce(Some("eighty")), None);
/// assert_eq!(strategy.coerce(None), None);
/// ```
pub struct CoercionStrategy<T> {
    source: StrategySource,
    type_name: &'static str,
    invoke: Invoke<T>,
}

impl<T> CoercionStrategy<T> {
    /// Applies the fixed precedence to a declared shape.
    ///
    /// Built-ins win first, then abstract types are rejected, then try
    /// factories, fallible factories and finally the constructor are searched
    /// in name order. `None` marks the type as permanently unresolvable.
    pub(crate) fn select(shape: TypeShape<T>) -> Option<Self> {
        let type_name = std::any::type_name::<T>();
        let strategy = |source, invoke| {
            Some(Self {
                source,
                type_name,
                invoke,
            })
        };

        if let Some(builtin) = &shape.builtin {
            return match *builtin {
                Builtin::Text(f) => strategy(StrategySource::Text, Invoke::Total(f)),
                Builtin::Enumeration(f) => strategy(StrategySource::Enumeration, Invoke::Try(f)),
                Builtin::Uri(f) => strategy(StrategySource::Uri, Invoke::Fallible(f)),
            };
        }

        if shape.is_abstract {
            return None;
        }

        for name in TryFactory::PRECEDENCE {
            if let Some(f) = shape.try_factory_named(name) {
                return strategy(StrategySource::TryFactory(name), Invoke::Try(f));
            }
        }

        for name in Factory::PRECEDENCE {
            if let Some(f) = shape.factory_named(name) {
                return strategy(StrategySource::Factory(name), Invoke::Fallible(f));
            }
        }

        shape
            .constructor
            .and_then(|f| strategy(StrategySource::Constructor, Invoke::Constructor(f)))
    }

    /// Returns the rule this strategy was built from.
    pub fn source(&self) -> StrategySource {
        self.source
    }

    /// Converts an optional input. Absent input fails without invoking anything.
    pub fn coerce(&self, input: Option<&str>) -> Option<T> {
        self.coerce_str(input?)
    }

    /// Converts text into a value.
    pub fn coerce_str(&self, input: &str) -> Option<T> {
        match &self.invoke {
            Invoke::Total(f) => self.guarded(|| Some(f(input))),
            Invoke::Try(f) => self.guarded(|| f(input)),
            Invoke::Fallible(f) => self.guarded(|| match f(input) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::trace!(
                        target_type = self.type_name,
                        source = %self.source,
                        error = %err,
                        "factory rejected input"
                    );
                    None
                }
            }),
            Invoke::Constructor(f) => self.guarded(|| Some(f(input.to_owned()))),
        }
    }

    fn guarded(&self, call: impl FnOnce() -> Option<T>) -> Option<T> {
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(
                    target_type = self.type_name,
                    source = %self.source,
                    "coercion factory panicked"
                );
                None
            }
        }
    }
}

impl<T> fmt::Debug for CoercionStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoercionStrategy")
            .field("type", &self.type_name)
            .field("source", &self.source)
            .finish()
    }
}
