//! Declared conversion shapes.
//!
//! A [`TypeShape`] lists the conventional factories a type offers for turning
//! text into a value. It is a plain table: declaring a factory says nothing
//! about whether it will be used. The resolver applies a fixed precedence over
//! the table to pick exactly one strategy per type.

use std::fmt;

use crate::error::FactoryError;

/// A factory that reports success alongside the value: `(text) -> (bool, T)`.
pub type TryFactoryFn<T> = fn(&str) -> Option<T>;

/// A factory that may fail by returning an error or panicking: `(text) -> T`.
pub type FactoryFn<T> = fn(&str) -> Result<T, FactoryError>;

/// A single-text-argument constructor. It may panic on bad input.
pub type ConstructorFn<T> = fn(String) -> T;

/// Conventional names of "try" factories, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TryFactory {
    /// `TryParse(text) -> (bool, T)`
    TryParse,
    /// `TryCreate(text) -> (bool, T)`
    TryCreate,
    /// `TryDeserialize(text) -> (bool, T)`
    TryDeserialize,
}

impl TryFactory {
    /// All try factories, highest precedence first.
    pub const PRECEDENCE: [TryFactory; 3] = [
        TryFactory::TryParse,
        TryFactory::TryCreate,
        TryFactory::TryDeserialize,
    ];

    /// Returns the conventional factory name.
    pub fn name(self) -> &'static str {
        match self {
            Self::TryParse => "TryParse",
            Self::TryCreate => "TryCreate",
            Self::TryDeserialize => "TryDeserialize",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::TryParse => 0,
            Self::TryCreate => 1,
            Self::TryDeserialize => 2,
        }
    }
}

impl fmt::Display for TryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conventional names of fallible factories, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Factory {
    /// `FromString(text) -> T`
    FromString,
    /// `Parse(text) -> T`
    Parse,
    /// `Create(text) -> T`
    Create,
    /// `Deserialize(text) -> T`
    Deserialize,
}

impl Factory {
    /// All fallible factories, highest precedence first.
    pub const PRECEDENCE: [Factory; 4] = [
        Factory::FromString,
        Factory::Parse,
        Factory::Create,
        Factory::Deserialize,
    ];

    /// Returns the conventional factory name.
    pub fn name(self) -> &'static str {
        match self {
            Self::FromString => "FromString",
            Self::Parse => "Parse",
            Self::Create => "Create",
            Self::Deserialize => "Deserialize",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::FromString => 0,
            Self::Parse => 1,
            Self::Create => 2,
            Self::Deserialize => 3,
        }
    }
}

impl fmt::Display for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fieldless enum whose variants can be parsed by name or discriminant.
///
/// # Examples
///
/// ```
/// use request_binder::{Coercible, Enumeration, TypeShape};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Priority {
///     Low = 1,
///     High = 5,
/// }
///
/// impl Enumeration for Priority {
///     const VARIANTS: &'static [Self] = &[Priority::Low, Priority::High];
///
///     fn name(&self) -> &'static str {
///         match self {
///             Priority::Low => "Low",
///             Priority::High => "High",
///         }
///     }
///
///     fn discriminant(&self) -> i64 {
///         *self as i64
///     }
/// }
///
/// impl Coercible for Priority {
///     fn shape() -> TypeShape<Self> {
///         TypeShape::enumeration()
///     }
/// }
/// ```
pub trait Enumeration: Sized + Clone + 'static {
    /// Every variant of the enum.
    const VARIANTS: &'static [Self];

    /// The variant's textual name.
    fn name(&self) -> &'static str;

    /// The variant's numeric value.
    fn discriminant(&self) -> i64;
}

/// Matches a variant by exact name, then by decimal discriminant.
pub(crate) fn parse_enumeration<T: Enumeration>(input: &str) -> Option<T> {
    let input = input.trim();

    if let Some(variant) = T::VARIANTS.iter().find(|v| v.name() == input) {
        return Some(variant.clone());
    }

    let discriminant: i64 = input.parse().ok()?;
    T::VARIANTS
        .iter()
        .find(|v| v.discriminant() == discriminant)
        .cloned()
}

/// Special-cased conversions checked before any factory.
pub(crate) enum Builtin<T> {
    Text(fn(&str) -> T),
    Enumeration(TryFactoryFn<T>),
    Uri(FactoryFn<T>),
}

/// The table of conversions a type declares.
///
/// Each factory is registered under its conventional name. Registering the
/// same name twice replaces the earlier function.
///
/// # Examples
///
/// ```
/// use request_binder::{Coercible, TryFactory, TypeShape};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Sku(String);
///
/// impl Coercible for Sku {
///     fn shape() -> TypeShape<Self> {
///         TypeShape::new().try_factory(TryFactory::TryParse, |input| {
///             input.starts_with("SKU-").then(|| Sku(input.to_string()))
///         })
///     }
/// }
/// ```
pub struct TypeShape<T> {
    pub(crate) builtin: Option<Builtin<T>>,
    pub(crate) is_abstract: bool,
    pub(crate) try_factories: [Option<TryFactoryFn<T>>; 3],
    pub(crate) factories: [Option<FactoryFn<T>>; 4],
    pub(crate) constructor: Option<ConstructorFn<T>>,
}

impl<T> TypeShape<T> {
    /// A shape with no conversions. Types left this way are unresolvable.
    pub fn new() -> Self {
        Self {
            builtin: None,
            is_abstract: false,
            try_factories: [None; 3],
            factories: [None; 4],
            constructor: None,
        }
    }

    /// Marks the type as the text type: input passes through unchanged.
    pub fn text(f: fn(&str) -> T) -> Self {
        Self {
            builtin: Some(Builtin::Text(f)),
            ..Self::new()
        }
    }

    /// Marks the type as URI-shaped.
    pub fn uri(f: FactoryFn<T>) -> Self {
        Self {
            builtin: Some(Builtin::Uri(f)),
            ..Self::new()
        }
    }

    /// Marks the type as an interface or abstract type.
    ///
    /// There is no way to choose an implementation from text, so the type is
    /// unresolvable no matter which factories are also declared.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Declares a try factory under the given name.
    pub fn try_factory(mut self, name: TryFactory, f: TryFactoryFn<T>) -> Self {
        self.try_factories[name.slot()] = Some(f);
        self
    }

    /// Declares a fallible factory under the given name.
    pub fn factory(mut self, name: Factory, f: FactoryFn<T>) -> Self {
        self.factories[name.slot()] = Some(f);
        self
    }

    /// Declares a single-text-argument constructor.
    pub fn constructor(mut self, f: ConstructorFn<T>) -> Self {
        self.constructor = Some(f);
        self
    }

    pub(crate) fn try_factory_named(&self, name: TryFactory) -> Option<TryFactoryFn<T>> {
        self.try_factories[name.slot()]
    }

    pub(crate) fn factory_named(&self, name: Factory) -> Option<FactoryFn<T>> {
        self.factories[name.slot()]
    }
}

impl<T: Enumeration> TypeShape<T> {
    /// Marks the type as an enumeration parsed by variant name or discriminant.
    pub fn enumeration() -> Self {
        Self {
            builtin: Some(Builtin::Enumeration(parse_enumeration::<T>)),
            ..Self::new()
        }
    }
}

impl<T> Default for TypeShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that declares how it is produced from text.
///
/// This replaces runtime reflection: instead of searching a type's static
/// methods, the binder asks the type for its [`TypeShape`] once and memoizes
/// the strategy it selects.
pub trait Coercible: Clone + Send + Sync + 'static {
    /// Returns the conversions this type offers.
    fn shape() -> TypeShape<Self>;
}
