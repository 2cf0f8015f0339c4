//! Synchronous callbacks invoked for every emitted record.
use crate::entry::Entry;
use std::error::Error as StdError;
use std::fmt;
use std::panic::RefUnwindSafe;
use std::sync::Arc;

/// The result type of a hook.
pub type HookResult = Result<(), Box<dyn StdError + Send + Sync>>;

/// A callback invoked synchronously, once per emitted record.
///
/// Hooks run after the record has been written to the sinks, whether or not
/// any sink accepted it. A failing hook is reported on the logger's error
/// output and does not prevent the other hooks from running.
///
/// # Examples
///
/// ```
/// use routelog::hook::Hook;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let c = Arc::clone(&count);
/// let hook = Hook::new(move |_entry| {
///     c.fetch_add(1, Ordering::SeqCst);
///     Ok(())
/// });
/// # let _ = hook;
/// ```
#[derive(Clone)]
pub struct Hook(Arc<dyn Fn(&Entry) -> HookResult + Send + Sync + RefUnwindSafe>);
impl Hook {
    /// Makes a new `Hook` instance.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Entry) -> HookResult + Send + Sync + RefUnwindSafe + 'static,
    {
        Hook(Arc::new(f))
    }

    pub(crate) fn call(&self, entry: &Entry) -> HookResult {
        (self.0)(entry)
    }
}
impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Hook").finish()
    }
}
