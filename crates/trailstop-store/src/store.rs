//! The transactional storage port.

use crate::error::StoreResult;
use crate::records::{CredentialRecord, SymbolRecord};
use trailstop_core::Ticker;

/// Port to the durable row store.
///
/// Each method is one atomic transaction: it opens a scope, mutates,
/// commits (or rolls back on error) and returns plain values. Concurrent
/// readers never observe a partially written row.
pub trait StateStore: Send + Sync {
    /// Load the singleton credential row, if one exists.
    fn load_credential(&self) -> StoreResult<Option<CredentialRecord>>;

    /// Atomically replace the singleton credential row.
    fn replace_credential(&self, credential: CredentialRecord) -> StoreResult<()>;

    /// Insert a new symbol row. Fails with `DuplicateSymbol` if the
    /// ticker is already tracked.
    fn insert_symbol(&self, symbol: SymbolRecord) -> StoreResult<()>;

    /// Overwrite an existing symbol row. Fails with `SymbolNotFound`
    /// if the ticker is not tracked.
    fn update_symbol(&self, symbol: SymbolRecord) -> StoreResult<()>;

    /// Delete a symbol row. Fails with `SymbolNotFound` if absent.
    fn remove_symbol(&self, ticker: &Ticker) -> StoreResult<()>;

    /// Fetch one symbol row by ticker.
    fn get_symbol(&self, ticker: &Ticker) -> StoreResult<Option<SymbolRecord>>;

    /// Fetch all tracked symbol rows.
    fn list_symbols(&self) -> StoreResult<Vec<SymbolRecord>>;
}
