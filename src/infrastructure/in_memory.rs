use crate::domain::ports::{Tables, TransactionalStore};
use crate::error::Result;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory transactional store.
///
/// Each transaction stages a copy of the committed tables, runs the closure
/// against the copy, and swaps it in only on `Ok`. A failed transaction
/// leaves the committed state untouched, and readers only ever see committed
/// state, so an order total can never be observed out of step with its items.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransactionalStore for InMemoryStore {
    fn run_in_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Tables) -> Result<T>,
    {
        let mut committed = self.lock();
        let mut staged = committed.clone();
        let value = work(&mut staged)?;
        *committed = staged;
        Ok(value)
    }

    fn read<T, F>(&self, work: F) -> T
    where
        F: FnOnce(&Tables) -> T,
    {
        work(&self.lock())
    }
}
