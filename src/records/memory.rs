use std::collections::BTreeSet;

use crate::model::TickerSymbol;

use super::{insert_into, remove_from, rename_in, StoreResult, TickerStore};

/// Volatile store, used where nothing needs to persist.
#[derive(Debug, Default, Clone)]
pub struct MemoryTickerStore {
    symbols: BTreeSet<TickerSymbol>,
}

impl TickerStore for MemoryTickerStore {
    fn init(&mut self) -> StoreResult<()> {
        Ok(())
    }

    fn list(&self) -> StoreResult<BTreeSet<TickerSymbol>> {
        Ok(self.symbols.clone())
    }

    fn insert(&mut self, symbol: TickerSymbol) -> StoreResult<()> {
        insert_into(&mut self.symbols, symbol)
    }

    fn rename(&mut self, old: &TickerSymbol, new: TickerSymbol) -> StoreResult<()> {
        rename_in(&mut self.symbols, old, new)
    }

    fn remove(&mut self, symbol: &TickerSymbol) -> StoreResult<()> {
        remove_from(&mut self.symbols, symbol)
    }
}
