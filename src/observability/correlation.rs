//! Ambient correlation id.
//!
//! A caller enters a [`CorrelationScope`] and every invocation made on that
//! thread while the scope is alive carries the id in the correlation header,
//! unless the request already has that header.

use std::cell::RefCell;
use std::marker::PhantomData;

use uuid::Uuid;

/// Header used when the configuration does not name one.
pub const DEFAULT_HEADER: &str = "trace-id";

thread_local! {
    static CURRENT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// The id of the innermost active scope on this thread.
pub fn current() -> Option<String> {
    CURRENT.with(|cell| cell.borrow().clone())
}

/// A fresh random id.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Installs a correlation id for the current thread until dropped.
///
/// Scopes nest; dropping one restores the id that was active before it.
#[must_use = "the id is cleared as soon as the scope is dropped"]
pub struct CorrelationScope {
    previous: Option<String>,
    // Bound to the thread that owns the thread-local slot.
    _not_send: PhantomData<*const ()>,
}

impl CorrelationScope {
    pub fn enter(id: impl Into<String>) -> Self {
        let previous = CURRENT.with(|cell| cell.replace(Some(id.into())));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for CorrelationScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|cell| *cell.borrow_mut() = previous);
    }
}
