//! Shared, ordered collections.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::Value;

/// An ordered, indexable collection with reference identity.
///
/// Cloning an `ArrayRef` clones the handle, not the elements: both clones
/// observe the same storage, and [`ArrayRef::ptr_eq`] reports them as the
/// same array. Because elements may hold handles, an array can contain
/// itself.
#[derive(Clone, Default)]
pub struct ArrayRef {
    inner: Arc<RwLock<Vec<Value>>>,
}

impl ArrayRef {
    /// Create an array holding `items`.
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.read_recursive().len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an element.
    pub fn push(&self, value: Value) {
        self.inner.write().push(value);
    }

    /// Replace the element at `index`, returning `false` when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.inner.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Clone of the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.read_recursive().get(index).cloned()
    }

    /// Borrow the elements.
    ///
    /// The guard is a recursive read lock, so holding it while reading the
    /// same array again further down a cyclic graph does not deadlock.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.inner.read_recursive()
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stable identity of the underlying storage, for visited sets.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl fmt::Debug for ArrayRef {
    // Elements are not printed: the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl From<Vec<Value>> for ArrayRef {
    fn from(items: Vec<Value>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<Value> for ArrayRef {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let a = ArrayRef::new(vec![Value::from(1)]);
        let b = a.clone();
        b.push(Value::from(2));
        assert_eq!(a.len(), 2);
        assert!(a.ptr_eq(&b));
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn distinct_arrays_have_distinct_identity() {
        let a = ArrayRef::default();
        let b = ArrayRef::default();
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn set_and_get() {
        let a: ArrayRef = (0..3).map(Value::from).collect();
        assert!(a.set(1, Value::from("x")));
        assert!(!a.set(10, Value::Null));
        assert_eq!(a.get(1).and_then(|v| v.as_str().map(str::to_owned)), Some("x".to_owned()));
        assert!(a.get(5).is_none());
    }

    #[test]
    fn self_containing_array_debug_terminates() {
        let a = ArrayRef::default();
        a.push(Value::Array(a.clone()));
        let rendered = format!("{a:?}");
        assert!(rendered.contains("len: 1"));
    }
}
