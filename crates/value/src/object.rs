//! Shared keyed objects and what can be learned about their type.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::Value;
use crate::error::NotPrintable;

/// What is known about an object's constructor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Class {
    /// A plain key/value object.
    #[default]
    Plain,
    /// An instance of a named class (`Date`, `Map`, `ValidationError`, ...).
    Named(String),
    /// The constructor exists but has no name.
    Anonymous,
    /// The constructor cannot be inspected at all.
    Hidden,
}

/// The constructor of an object could not be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("object type cannot be introspected")]
pub struct IntrospectionError;

impl Class {
    /// Resolve the constructor name.
    ///
    /// `Ok(None)` means the constructor is anonymous.
    pub fn name(&self) -> Result<Option<&str>, IntrospectionError> {
        match self {
            Self::Plain => Ok(Some("Object")),
            Self::Named(name) if name.is_empty() => Ok(None),
            Self::Named(name) => Ok(Some(name.as_str())),
            Self::Anonymous => Ok(None),
            Self::Hidden => Err(IntrospectionError),
        }
    }
}

/// How an object converts itself to a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Repr {
    /// The generic `[object Object]` form.
    #[default]
    Default,
    /// A custom string form.
    Text(String),
    /// String conversion fails.
    Unprintable,
}

struct ObjectData {
    class: Class,
    repr: Repr,
    fields: RwLock<IndexMap<String, Value>>,
}

/// A keyed object with reference identity.
///
/// Field order is insertion order. Like [`crate::ArrayRef`], clones share
/// storage and an object may (directly or indirectly) contain itself.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<ObjectData>,
}

impl ObjectRef {
    /// Create an empty object of the given class.
    pub fn new(class: Class) -> Self {
        Self::with_repr(class, Repr::Default)
    }

    /// Create an empty object with an explicit string form.
    pub fn with_repr(class: Class, repr: Repr) -> Self {
        Self {
            inner: Arc::new(ObjectData {
                class,
                repr,
                fields: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// Create an empty plain object.
    pub fn plain() -> Self {
        Self::new(Class::Plain)
    }

    /// Constructor information.
    pub fn class(&self) -> &Class {
        &self.inner.class
    }

    /// String-conversion behaviour.
    pub fn repr(&self) -> &Repr {
        &self.inner.repr
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.fields.write().insert(key.into(), value)
    }

    /// Remove a field.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.fields.write().shift_remove(key)
    }

    /// Clone of the field stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.fields.read_recursive().get(key).cloned()
    }

    /// Whether a field named `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.fields.read_recursive().contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.inner.fields.read_recursive().len()
    }

    /// Whether the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the fields (recursive read lock, see [`crate::ArrayRef::read`]).
    pub fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Value>> {
        self.inner.fields.read_recursive()
    }

    /// Best-effort string conversion of the object itself.
    pub fn to_display_string(&self) -> Result<String, NotPrintable> {
        match &self.inner.repr {
            Repr::Default => Ok("[object Object]".to_owned()),
            Repr::Text(text) => Ok(text.clone()),
            Repr::Unprintable => Err(NotPrintable),
        }
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable identity of the underlying object, for visited sets.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("class", &self.inner.class)
            .field("keys", &self.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ObjectRef {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let object = Self::plain();
        {
            let mut fields = object.inner.fields.write();
            for (key, value) in iter {
                fields.insert(key.into(), value);
            }
        }
        object
    }
}
