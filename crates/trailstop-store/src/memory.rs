//! In-memory `StateStore` implementation.
//!
//! A single mutex over both tables makes every operation a serialized
//! atomic transaction, matching the guarantees an embedded SQL store
//! would provide. Used by tests and as the default runtime store.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use trailstop_core::Ticker;

use crate::error::{StoreError, StoreResult};
use crate::records::{CredentialRecord, SymbolRecord};
use crate::store::StateStore;

#[derive(Debug, Default)]
struct Tables {
    credential: Option<CredentialRecord>,
    symbols: BTreeMap<Ticker, SymbolRecord>,
}

/// In-memory row store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load_credential(&self) -> StoreResult<Option<CredentialRecord>> {
        Ok(self.tables.lock().credential.clone())
    }

    fn replace_credential(&self, credential: CredentialRecord) -> StoreResult<()> {
        self.tables.lock().credential = Some(credential);
        Ok(())
    }

    fn insert_symbol(&self, symbol: SymbolRecord) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        if tables.symbols.contains_key(&symbol.ticker) {
            return Err(StoreError::DuplicateSymbol(symbol.ticker));
        }
        tables.symbols.insert(symbol.ticker.clone(), symbol);
        Ok(())
    }

    fn update_symbol(&self, symbol: SymbolRecord) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        if !tables.symbols.contains_key(&symbol.ticker) {
            return Err(StoreError::SymbolNotFound(symbol.ticker));
        }
        tables.symbols.insert(symbol.ticker.clone(), symbol);
        Ok(())
    }

    fn remove_symbol(&self, ticker: &Ticker) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        tables
            .symbols
            .remove(ticker)
            .map(|_| ())
            .ok_or_else(|| StoreError::SymbolNotFound(ticker.clone()))
    }

    fn get_symbol(&self, ticker: &Ticker) -> StoreResult<Option<SymbolRecord>> {
        Ok(self.tables.lock().symbols.get(ticker).cloned())
    }

    fn list_symbols(&self) -> StoreResult<Vec<SymbolRecord>> {
        Ok(self.tables.lock().symbols.values().cloned().collect())
    }
}
