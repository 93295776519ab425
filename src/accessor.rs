//! Typed, in-place property assignment.
//!
//! A [`PropertyAccessor`] erases the property's declared type behind a small
//! object so a catalog can hold every property of a request type in one list,
//! while assignment itself stays fully typed and monomorphized.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::coerce::{Coercible, CoercionStrategy};

/// Identity of a property's declared type.
#[derive(Clone, Copy)]
pub struct PropertyType {
    id: TypeId,
    name: &'static str,
}

impl PropertyType {
    /// Returns the identity of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the type's `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the type's name as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this is exactly `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for PropertyType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PropertyType {}

impl Hash for PropertyType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value supplied by a binding source that may already be typed.
///
/// Implemented for every `Display + Debug` type that is `Send + Sync`, so
/// route matching can hand over parsed values as-is.
pub trait SourceValue: Any + fmt::Display + fmt::Debug + Send + Sync {
    /// Returns `self` as `&dyn Any` for exact-type checks.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Display + fmt::Debug + Send + Sync> SourceValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Raw input for one property, as seen by an accessor.
#[derive(Debug, Clone, Copy)]
pub enum RawValue<'a> {
    /// Plain text from a form field, query parameter, header or claim.
    Text(&'a str),
    /// A possibly typed value, e.g. from route matching.
    Value(&'a dyn SourceValue),
}

impl<'a> RawValue<'a> {
    fn as_any(&self) -> Option<&'a dyn Any> {
        match *self {
            RawValue::Text(_) => None,
            RawValue::Value(value) => Some(value.as_any()),
        }
    }

    /// Renders the value as text.
    pub fn render(&self) -> Cow<'a, str> {
        match *self {
            RawValue::Text(text) => Cow::Borrowed(text),
            RawValue::Value(value) => Cow::Owned(value.to_string()),
        }
    }
}

/// Type-erased assignment into one property of `R`.
trait PropertySlot<R>: Send + Sync {
    fn property_type(&self) -> PropertyType;
    fn can_coerce(&self) -> bool;
    fn try_parse_and_set(&self, target: &mut R, raw: RawValue<'_>) -> bool;
    fn set_value_directly(&self, target: &mut R, value: &dyn Any) -> bool;
}

struct TypedSlot<R, T> {
    setter: fn(&mut R, T),
    strategy: Option<Arc<CoercionStrategy<T>>>,
}

impl<R: 'static, T: Coercible> PropertySlot<R> for TypedSlot<R, T> {
    fn property_type(&self) -> PropertyType {
        PropertyType::of::<T>()
    }

    fn can_coerce(&self) -> bool {
        self.strategy.is_some()
    }

    fn try_parse_and_set(&self, target: &mut R, raw: RawValue<'_>) -> bool {
        if let Some(value) = raw.as_any().and_then(|any| any.downcast_ref::<T>()) {
            (self.setter)(target, value.clone());
            return true;
        }

        let Some(strategy) = &self.strategy else {
            return false;
        };

        match strategy.coerce_str(&raw.render()) {
            Some(value) => {
                (self.setter)(target, value);
                true
            }
            None => false,
        }
    }

    fn set_value_directly(&self, target: &mut R, value: &dyn Any) -> bool {
        match value.downcast_ref::<T>() {
            Some(value) => {
                (self.setter)(target, value.clone());
                true
            }
            None => false,
        }
    }
}

/// Forwards to an accessor of an embedded struct reached through `project`.
struct FlattenedSlot<R, B> {
    project: fn(&mut R) -> &mut B,
    inner: Box<dyn PropertySlot<B>>,
}

impl<R: 'static, B: 'static> PropertySlot<R> for FlattenedSlot<R, B> {
    fn property_type(&self) -> PropertyType {
        self.inner.property_type()
    }

    fn can_coerce(&self) -> bool {
        self.inner.can_coerce()
    }

    fn try_parse_and_set(&self, target: &mut R, raw: RawValue<'_>) -> bool {
        self.inner.try_parse_and_set((self.project)(target), raw)
    }

    fn set_value_directly(&self, target: &mut R, value: &dyn Any) -> bool {
        self.inner.set_value_directly((self.project)(target), value)
    }
}

/// One writable property of a request type.
///
/// Holds the property name, its declared type, the assignment function and the
/// coercion strategy for the declared type (if one exists). Accessors are
/// immutable after construction; all mutation goes to the `&mut R` passed in,
/// never to a copy.
pub struct PropertyAccessor<R> {
    name: String,
    slot: Box<dyn PropertySlot<R>>,
}

impl<R: 'static> PropertyAccessor<R> {
    pub(crate) fn new<T: Coercible>(
        name: impl Into<String>,
        setter: fn(&mut R, T),
        strategy: Option<Arc<CoercionStrategy<T>>>,
    ) -> Self {
        Self {
            name: name.into(),
            slot: Box::new(TypedSlot { setter, strategy }),
        }
    }

    /// Re-targets this accessor at an outer type that embeds `R`.
    pub(crate) fn flatten<O: 'static>(self, project: fn(&mut O) -> &mut R) -> PropertyAccessor<O> {
        PropertyAccessor {
            name: self.name,
            slot: Box::new(FlattenedSlot {
                project,
                inner: self.slot,
            }),
        }
    }

    /// Returns the property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property's declared type.
    pub fn property_type(&self) -> PropertyType {
        self.slot.property_type()
    }

    /// Returns `true` if the declared type has a coercion strategy.
    pub fn can_coerce(&self) -> bool {
        self.slot.can_coerce()
    }

    /// Produces a value from `raw` and assigns it.
    ///
    /// - `None` input fails without mutation.
    /// - A typed input whose runtime type is exactly the declared type is
    ///   assigned directly.
    /// - Otherwise the input is rendered as text and coerced; on failure, or
    ///   when the type has no strategy, the target is left untouched.
    pub fn try_parse_and_set(&self, target: &mut R, raw: Option<RawValue<'_>>) -> bool {
        match raw {
            Some(raw) => self.slot.try_parse_and_set(target, raw),
            None => false,
        }
    }

    /// Returns `true` iff `V` is exactly the declared type.
    pub fn can_set_value_directly<V: 'static>(&self) -> bool {
        self.property_type().is::<V>()
    }

    /// Assigns `value` without coercion. Fails unless `V` is the declared type.
    pub fn set_value_directly<V: Any>(&self, target: &mut R, value: V) -> bool {
        self.slot.set_value_directly(target, &value)
    }
}

impl<R> fmt::Debug for PropertyAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("name", &self.name)
            .field("type", &self.slot.property_type())
            .field("can_coerce", &self.slot.can_coerce())
            .finish()
    }
}
