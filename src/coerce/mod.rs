//! Text-to-value coercion.
//!
//! # Resolution order
//!
//! For each target type the resolver inspects the declared [`TypeShape`] once
//! and selects the first match:
//!
//! 1. built-ins: text passthrough, enumeration parsing, URI construction
//! 2. abstract types are unresolvable
//! 3. try factories: `TryParse`, `TryCreate`, `TryDeserialize`
//! 4. fallible factories: `FromString`, `Parse`, `Create`, `Deserialize`
//! 5. a single-text-argument constructor
//! 6. otherwise the type is permanently unresolvable
//!
//! The outcome is memoized in a [`CoercionRegistry`].

mod builtin;
mod resolver;
mod shape;
mod strategy;

pub use resolver::CoercionRegistry;
pub use shape::{
    Coercible, ConstructorFn, Enumeration, Factory, FactoryFn, TryFactory, TryFactoryFn, TypeShape,
};
pub use strategy::{CoercionStrategy, StrategySource};
