//! Ambient chain selection.
//!
//! Two scoping mechanisms feed [`current_chain`]:
//!
//! - a per-thread override stack, pushed by [`enter_chain`] and popped when
//!   the returned [`ChainGuard`] drops (the guard is `!Send`, so it cannot
//!   leave the thread that pushed it);
//! - a task-local override set by [`scope_chain`] for the duration of a
//!   future, which follows the future across worker threads.
//!
//! The innermost thread guard wins over a task scope; with neither, the
//! configured default chain applies.
//!
//! [`enter_chain`] and [`with_chain`] are for synchronous scopes. A guard
//! held across an `.await` stays pushed while sibling futures on the same
//! thread run (`join!`, a current-thread runtime), so they observe it too.
//! Async code selects a chain with [`scope_chain`], which is restored each
//! time its future yields.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;

use tracing::trace;
use unimove_types::{ChainId, ConfigurationError};

use crate::config::config;

thread_local! {
    static CHAIN_STACK: RefCell<Vec<ChainId>> = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    static TASK_CHAIN: ChainId;
}

/// Restores the previous ambient chain on drop.
#[must_use = "the override ends when the guard is dropped"]
#[derive(Debug)]
pub struct ChainGuard {
    depth: usize,
    chain: ChainId,
    _not_send: PhantomData<*const ()>,
}

impl ChainGuard {
    pub fn chain(&self) -> ChainId {
        self.chain
    }
}

impl Drop for ChainGuard {
    fn drop(&mut self) {
        // Truncate rather than pop so an out-of-order drop also releases
        // every override pushed after this one.
        CHAIN_STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
        trace!(chain = %self.chain, depth = self.depth, "left chain scope");
    }
}

/// Override the ambient chain on this thread until the guard drops.
pub fn enter_chain(chain: ChainId) -> ChainGuard {
    let depth = CHAIN_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(chain);
        stack.len() - 1
    });
    trace!(%chain, depth, "entered chain scope");
    ChainGuard {
        depth,
        chain,
        _not_send: PhantomData,
    }
}

/// [`enter_chain`] for a chain named by a string.
pub fn enter_chain_str(chain: &str) -> Result<ChainGuard, ConfigurationError> {
    Ok(enter_chain(chain.parse()?))
}

/// Run `f` with `chain` as the ambient chain.
pub fn with_chain<R>(chain: ChainId, f: impl FnOnce() -> R) -> R {
    let _guard = enter_chain(chain);
    f()
}

/// Run `future` with `chain` as the ambient chain of its task.
pub async fn scope_chain<F: Future>(chain: ChainId, future: F) -> F::Output {
    TASK_CHAIN.scope(chain, future).await
}

/// The innermost override, if any.
pub fn scoped_chain() -> Option<ChainId> {
    CHAIN_STACK
        .with(|stack| stack.borrow().last().copied())
        .or_else(|| TASK_CHAIN.try_with(|chain| *chain).ok())
}

/// The ambient chain: innermost override, else the configured default.
pub fn current_chain() -> Option<ChainId> {
    scoped_chain().or(config().default_chain)
}
