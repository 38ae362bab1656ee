//! Mutation Store
//!
//! A [`Store`] wraps a [`ReactiveObject`] and funnels every state change
//! through a named mutation. Committing a mutation runs its handler against
//! the reactive state, then tells every store subscriber which mutation ran.
//!
//! Because the state is reactive, anything that reads it inside `watch`
//! re-runs after a commit, on the next tick like any other write.
//!
//! ```rust,ignore
//! let store = Store::builder()
//!     .state("count", 0)
//!     .mutation("addCount", |state, payload| {
//!         let step = payload.copied().unwrap_or(1);
//!         state.update("count", |count| count + step);
//!     })
//!     .plugin(|store| {
//!         store.subscribe(|mutation, _state| println!("{mutation:?}"));
//!     })
//!     .build();
//!
//! store.commit("addCount", Some(1))?;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::reactive::{reactive, ReactiveObject};

type MutationHandler<V> = Box<dyn Fn(&ReactiveObject<V>, Option<&V>)>;
type MutationObserver<V> = Rc<dyn Fn(&MutationRecord<V>, &ReactiveObject<V>)>;
type Plugin<V> = Box<dyn FnOnce(&Store<V>)>;

/// A committed mutation, as seen by store subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord<V> {
    /// Name of the mutation.
    pub kind: String,
    pub payload: Option<V>,
}

/// Reactive state plus the named mutations allowed to change it.
pub struct Store<V> {
    state: ReactiveObject<V>,
    mutations: IndexMap<String, MutationHandler<V>>,
    subscribers: RefCell<Vec<MutationObserver<V>>>,
}

/// Builder for [`Store`].
pub struct StoreBuilder<V> {
    state: Vec<(String, V)>,
    mutations: IndexMap<String, MutationHandler<V>>,
    plugins: Vec<Plugin<V>>,
}

impl<V> Store<V> {
    pub fn builder() -> StoreBuilder<V> {
        StoreBuilder {
            state: Vec::new(),
            mutations: IndexMap::new(),
            plugins: Vec::new(),
        }
    }

    /// The reactive state.
    pub fn state(&self) -> &ReactiveObject<V> {
        &self.state
    }

    /// Register an observer called after every successful commit.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&MutationRecord<V>, &ReactiveObject<V>) + 'static,
    {
        self.subscribers.borrow_mut().push(Rc::new(observer));
    }

    /// Registered mutation names, in registration order.
    pub fn mutation_names(&self) -> impl Iterator<Item = &str> {
        self.mutations.keys().map(String::as_str)
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<V: Clone> Store<V> {
    /// Run the named mutation with an optional payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMutation`] if no mutation has that name. The
    /// state is left untouched and no observer is called.
    pub fn commit(&self, kind: &str, payload: Option<V>) -> Result<()> {
        let Some(handler) = self.mutations.get(kind) else {
            warn!(mutation = kind, "unknown mutation type");
            return Err(Error::UnknownMutation(kind.to_string()));
        };

        debug!(mutation = kind, "commit");
        handler(&self.state, payload.as_ref());

        let record = MutationRecord {
            kind: kind.to_string(),
            payload,
        };

        // Observers may subscribe more observers; they join the next commit.
        let observers: Vec<_> = self.subscribers.borrow().iter().cloned().collect();
        for observer in observers {
            observer(&record, &self.state);
        }

        Ok(())
    }
}

impl<V: 'static> StoreBuilder<V> {
    /// Add a state field. Every field added here is reactive.
    pub fn state(mut self, key: impl Into<String>, value: V) -> Self {
        self.state.push((key.into(), value));
        self
    }

    /// Register a mutation. A later registration with the same name replaces
    /// the earlier one.
    pub fn mutation<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ReactiveObject<V>, Option<&V>) + 'static,
    {
        self.mutations.insert(name.into(), Box::new(handler));
        self
    }

    /// Register a plugin, called once with the built store.
    pub fn plugin<F>(mut self, plugin: F) -> Self
    where
        F: FnOnce(&Store<V>) + 'static,
    {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn build(self) -> Store<V> {
        let store = Store {
            state: reactive(self.state),
            mutations: self.mutations,
            subscribers: RefCell::new(Vec::new()),
        };

        for plugin in self.plugins {
            plugin(&store);
        }

        store
    }
}

impl<V: Clone + fmt::Debug> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("mutations", &self.mutations.keys().collect::<Vec<_>>())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
