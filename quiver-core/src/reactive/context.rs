//! Reactive Context
//!
//! The reactive context tracks which subscriber is currently running. When a
//! reactive property is read, its Dep asks the context for the current
//! subscriber and registers it.
//!
//! # Implementation
//!
//! A thread-local stack holds the running subscribers. Entering a context
//! pushes, and dropping the returned guard pops, so the stack is restored on
//! every exit path including a panic. Outside of any `watch` the stack is
//! empty and reads register nothing.
//!
//! With a single level this behaves exactly like a single "active" slot.
//! Nested `watch` calls push a second entry, and the outer subscriber becomes
//! current again once the inner one finishes.

use std::cell::RefCell;

use super::Subscriber;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Subscriber>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    subscriber: Subscriber,
}

impl ReactiveContext {
    /// Enter a new reactive context for the given subscriber.
    ///
    /// While this context is active, every reactive read registers the
    /// subscriber with the Dep being read.
    pub fn enter(subscriber: Subscriber) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(subscriber.clone());
        });

        Self { subscriber }
    }

    /// Check if there is an active reactive context.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the current subscriber, if any.
    pub fn current_subscriber() -> Option<Subscriber> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Number of nested contexts currently entered.
    pub fn depth() -> usize {
        CONTEXT_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.id(),
                    self.subscriber.id(),
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber.id(),
                    entry.id()
                );
            }
        });
    }
}
