//! Reactive Cells
//!
//! A [`Ref`] is a boxed reactive value. It pairs the value with a private
//! [`Dep`]: reading through the accessor registers the running subscriber,
//! writing stores the value and queues every registered subscriber.
//!
//! # No diffing
//!
//! Writes never compare against the current value. Writing the value a cell
//! already holds still notifies, so subscribers re-run on every write.
//!
//! # Example
//!
//! ```rust,ignore
//! let count = reference(0);
//!
//! watch({
//!     let count = count.clone();
//!     move || println!("count = {}", count.value())
//! });
//!
//! count.set_value(5);
//! run_microtasks(); // prints "count = 5"
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::dep::Dep;

/// Explicit read/write access to a reactive property.
///
/// Implemented by [`Ref`] and by the fields of a
/// [`ReactiveObject`](super::ReactiveObject).
pub trait Accessor<T> {
    /// Read the value, registering the running subscriber.
    fn read(&self) -> T;

    /// Store a value and notify subscribers.
    fn write(&self, value: T);
}

struct RefInner<T> {
    value: RefCell<T>,
    dep: Dep,
}

/// A reactive cell holding a value of type `T`.
///
/// Cloning a `Ref` produces another handle to the same cell.
pub struct Ref<T> {
    inner: Rc<RefInner<T>>,
}

/// Create a reactive cell with the given initial value.
pub fn reference<T>(initial: T) -> Ref<T> {
    Ref::new(initial)
}

impl<T> Ref<T> {
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefInner {
                value: RefCell::new(value),
                dep: Dep::new(),
            }),
        }
    }

    /// Borrow the value, registering the running subscriber.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.dep.depend();
        f(&self.inner.value.borrow())
    }

    /// Store a new value and notify subscribers.
    pub fn set_value(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.inner.dep.notify();
    }

    /// Replace the value with `f(&current)` and notify subscribers.
    ///
    /// The read of the current value is not tracked.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.inner.value.borrow());
        self.set_value(next);
    }

    /// The Dep backing this cell.
    pub fn dep(&self) -> &Dep {
        &self.inner.dep
    }

    /// Number of subscribers registered with this cell.
    pub fn subscriber_count(&self) -> usize {
        self.inner.dep.subscriber_count()
    }

    /// Whether two handles point at the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Ref<T> {
    /// Read the value, registering the running subscriber.
    pub fn value(&self) -> T {
        self.with(T::clone)
    }

    /// Read the value without registering anything.
    pub fn value_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: Clone> Accessor<T> for Ref<T> {
    fn read(&self) -> T {
        self.value()
    }

    fn write(&self, value: T) {
        self.set_value(value);
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("value", &*self.inner.value.borrow())
            .field("dep", &self.inner.dep)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
