//! Reactive Objects
//!
//! A [`ReactiveObject`] is a map of named fields where every field present at
//! construction time is reactive: it is backed by its own [`Ref`], so reading
//! a field tracks it and writing a field notifies its subscribers.
//!
//! Fields inserted later are plain. They store a value like any other field
//! but have no Dep, so reads are never tracked and writes never notify.
//! Reactivity is decided once, by [`reactive`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::cell::{Accessor, Ref};

enum Field<V> {
    Tracked(Ref<V>),
    Plain(V),
}

/// A map of named reactive fields.
///
/// Cloning a `ReactiveObject` produces another handle to the same fields.
pub struct ReactiveObject<V> {
    fields: Rc<RefCell<IndexMap<String, Field<V>>>>,
}

/// Make every entry of `entries` a reactive field.
///
/// Field order follows iteration order of `entries`. A key that appears more
/// than once keeps its last value.
pub fn reactive<K, V, I>(entries: I) -> ReactiveObject<V>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let fields = entries
        .into_iter()
        .map(|(key, value)| (key.into(), Field::Tracked(Ref::new(value))))
        .collect();

    ReactiveObject {
        fields: Rc::new(RefCell::new(fields)),
    }
}

impl<V> ReactiveObject<V> {
    /// The accessor of a reactive field.
    ///
    /// Returns `None` for missing keys and for plain fields.
    pub fn field(&self, key: &str) -> Option<Ref<V>> {
        match self.fields.borrow().get(key)? {
            Field::Tracked(cell) => Some(cell.clone()),
            Field::Plain(_) => None,
        }
    }

    /// Whether `key` exists and is reactive.
    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.fields.borrow().get(key), Some(Field::Tracked(_)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.borrow().contains_key(key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }

    /// Write a field.
    ///
    /// Reactive fields store the value and notify. Plain fields are
    /// overwritten silently, and a missing key is inserted as a plain field.
    pub fn set(&self, key: &str, value: V) {
        if let Some(cell) = self.field(key) {
            cell.set_value(value);
            return;
        }

        let mut fields = self.fields.borrow_mut();
        match fields.get_mut(key) {
            Some(Field::Plain(slot)) => *slot = value,
            _ => {
                fields.insert(key.to_string(), Field::Plain(value));
            }
        }
    }

    /// Replace a field's value with `f(&current)`.
    ///
    /// Returns `false` if the key is missing.
    pub fn update(&self, key: &str, f: impl FnOnce(&V) -> V) -> bool {
        if let Some(cell) = self.field(key) {
            cell.update(f);
            return true;
        }

        let mut fields = self.fields.borrow_mut();
        match fields.get_mut(key) {
            Some(Field::Plain(slot)) => {
                *slot = f(slot);
                true
            }
            _ => false,
        }
    }
}

impl<V: Clone> ReactiveObject<V> {
    /// Read a field, registering the running subscriber if it is reactive.
    pub fn get(&self, key: &str) -> Option<V> {
        // The map borrow is released before the read so a subscriber can
        // insert fields while it runs.
        let cell = {
            let fields = self.fields.borrow();
            match fields.get(key)? {
                Field::Tracked(cell) => cell.clone(),
                Field::Plain(value) => return Some(value.clone()),
            }
        };
        Some(cell.read())
    }

    /// Read every field without registering anything.
    pub fn snapshot(&self) -> Vec<(String, V)> {
        self.fields
            .borrow()
            .iter()
            .map(|(key, field)| {
                let value = match field {
                    Field::Tracked(cell) => cell.value_untracked(),
                    Field::Plain(value) => value.clone(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl<V> Clone for ReactiveObject<V> {
    fn clone(&self) -> Self {
        Self {
            fields: Rc::clone(&self.fields),
        }
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for ReactiveObject<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subscriber;
    use crate::scheduler::{pending_jobs, run_microtasks};
    use std::cell::Cell;

    #[test]
    fn existing_fields_are_reactive() {
        let state = reactive([("count", 0), ("total", 10)]);

        assert!(state.is_reactive("count"));
        assert!(state.is_reactive("total"));
        assert_eq!(state.keys(), vec!["count", "total"]);
        assert_eq!(state.get("count"), Some(0));
    }

    #[test]
    fn later_fields_are_plain() {
        let state = reactive([("count", 0)]);
        state.set("extra", 5);

        assert!(state.contains_key("extra"));
        assert!(!state.is_reactive("extra"));
        assert!(state.field("extra").is_none());
        assert_eq!(state.get("extra"), Some(5));
    }

    #[test]
    fn missing_key_reads_none() {
        let state = reactive([("count", 0)]);
        assert_eq!(state.get("nope"), None);
        assert!(!state.update("nope", |v| v + 1));
    }

    #[test]
    fn field_writes_notify_and_plain_writes_do_not() {
        let runs = Rc::new(Cell::new(0));
        let state = reactive([("count", 0)]);
        state.set("extra", 0);

        let runs_clone = runs.clone();
        let state_clone = state.clone();
        let subscriber = Subscriber::new(move || {
            let _ = state_clone.get("count");
            let _ = state_clone.get("extra");
            runs_clone.set(runs_clone.get() + 1);
        });
        subscriber.run();

        state.set("extra", 1);
        assert_eq!(pending_jobs(), 0);

        state.update("count", |v| v + 1);
        assert_eq!(pending_jobs(), 1);

        run_microtasks();
        assert_eq!(runs.get(), 2);
        assert_eq!(state.get("count"), Some(1));
        assert_eq!(state.get("extra"), Some(1));
    }

    #[test]
    fn field_accessor_shares_state() {
        let state = reactive([("name", String::from("quiver"))]);
        let name = state.field("name").unwrap();

        name.write("arrow".to_string());
        assert_eq!(state.get("name").as_deref(), Some("arrow"));
    }

    #[test]
    fn snapshot_reads_all_fields() {
        let state = reactive([("a", 1), ("b", 2)]);
        state.set("c", 3);
        assert_eq!(
            state.snapshot(),
            vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)]
        );
    }
}
