use std::collections::BTreeSet;

use crate::error::StoreError;
use crate::model::TickerSymbol;

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvTickerStore;
pub use memory::MemoryTickerStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Keyed set of registered ticker symbols.
pub trait TickerStore {
    fn init(&mut self) -> StoreResult<()>;
    fn list(&self) -> StoreResult<BTreeSet<TickerSymbol>>;
    /// Fails with `DuplicateKey` when the symbol is already present.
    fn insert(&mut self, symbol: TickerSymbol) -> StoreResult<()>;
    fn rename(&mut self, old: &TickerSymbol, new: TickerSymbol) -> StoreResult<()>;
    fn remove(&mut self, symbol: &TickerSymbol) -> StoreResult<()>;
}

/// Normalise raw user input and register it.
pub fn register_ticker<S: TickerStore + ?Sized>(
    store: &mut S,
    raw: &str,
    suffix: &str,
) -> StoreResult<TickerSymbol> {
    let symbol = TickerSymbol::parse(raw, suffix)?;
    store.insert(symbol.clone())?;
    Ok(symbol)
}

pub fn rename_ticker<S: TickerStore + ?Sized>(
    store: &mut S,
    old_raw: &str,
    new_raw: &str,
    suffix: &str,
) -> StoreResult<TickerSymbol> {
    let old = TickerSymbol::parse(old_raw, suffix)?;
    let new = TickerSymbol::parse(new_raw, suffix)?;
    store.rename(&old, new.clone())?;
    Ok(new)
}

pub fn remove_ticker<S: TickerStore + ?Sized>(
    store: &mut S,
    raw: &str,
    suffix: &str,
) -> StoreResult<TickerSymbol> {
    let symbol = TickerSymbol::parse(raw, suffix)?;
    store.remove(&symbol)?;
    Ok(symbol)
}

pub(crate) fn insert_into(set: &mut BTreeSet<TickerSymbol>, symbol: TickerSymbol) -> StoreResult<()> {
    if set.contains(&symbol) {
        return Err(StoreError::DuplicateKey(symbol));
    }
    set.insert(symbol);
    Ok(())
}

pub(crate) fn rename_in(
    set: &mut BTreeSet<TickerSymbol>,
    old: &TickerSymbol,
    new: TickerSymbol,
) -> StoreResult<()> {
    if !set.contains(old) {
        return Err(StoreError::NotFound(old.clone()));
    }
    if *old == new {
        return Ok(());
    }
    if set.contains(&new) {
        return Err(StoreError::DuplicateKey(new));
    }
    set.remove(old);
    set.insert(new);
    Ok(())
}

pub(crate) fn remove_from(set: &mut BTreeSet<TickerSymbol>, symbol: &TickerSymbol) -> StoreResult<()> {
    if set.remove(symbol) {
        Ok(())
    } else {
        Err(StoreError::NotFound(symbol.clone()))
    }
}
