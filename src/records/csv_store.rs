use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::StoreError;
use crate::model::TickerSymbol;

use super::{insert_into, remove_from, rename_in, StoreResult, TickerStore};

const HEADER: &str = "ticker";

/// Ticker list persisted as a single-column CSV file.
///
/// Rows are normalised with the market suffix on load, so hand-edited entries such as
/// `petr4` read back as `PETR4.SA`.
pub struct CsvTickerStore {
    path: PathBuf,
    market_suffix: String,
}

impl CsvTickerStore {
    pub fn new(path: impl Into<PathBuf>, market_suffix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            market_suffix: market_suffix.into(),
        }
    }

    fn load(&self) -> StoreResult<BTreeSet<TickerSymbol>> {
        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(err) if is_not_found(&err) => return Ok(BTreeSet::new()),
            Err(err) => return Err(StoreError::backend(err)),
        };

        let mut symbols = BTreeSet::new();
        for result in reader.records() {
            let record = result.map_err(StoreError::backend)?;
            let Some(raw) = record.get(0) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            match TickerSymbol::parse(raw, &self.market_suffix) {
                Ok(symbol) => {
                    symbols.insert(symbol);
                }
                Err(err) => warn!("skipping row in {}: {}", self.path.display(), err),
            }
        }
        Ok(symbols)
    }

    /// Write through a sibling temp file so a crash never leaves a truncated list.
    fn save(&self, symbols: &BTreeSet<TickerSymbol>) -> StoreResult<()> {
        self.ensure_parent()?;
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp).map_err(StoreError::backend)?;
            writer.write_record([HEADER]).map_err(StoreError::backend)?;
            for symbol in symbols {
                writer
                    .write_record([symbol.as_str()])
                    .map_err(StoreError::backend)?;
            }
            writer.flush().map_err(StoreError::backend)?;
        }
        fs::rename(&tmp, &self.path).map_err(|err| {
            StoreError::Backend(format!(
                "failed to replace {}: {}",
                self.path.display(),
                err
            ))
        })?;
        debug!(
            "persisted {} tickers to {}",
            symbols.len(),
            self.path.display()
        );
        Ok(())
    }

    fn ensure_parent(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    StoreError::Backend(format!(
                        "failed to create directory {}: {}",
                        parent.display(),
                        err
                    ))
                })?;
            }
        }
        Ok(())
    }

    fn modify<F>(&mut self, op: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeSet<TickerSymbol>) -> StoreResult<()>,
    {
        let mut symbols = self.load()?;
        op(&mut symbols)?;
        self.save(&symbols)
    }
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound)
}

impl TickerStore for CsvTickerStore {
    fn init(&mut self) -> StoreResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&BTreeSet::new())
    }

    fn list(&self) -> StoreResult<BTreeSet<TickerSymbol>> {
        self.load()
    }

    fn insert(&mut self, symbol: TickerSymbol) -> StoreResult<()> {
        self.modify(|set| insert_into(set, symbol))
    }

    fn rename(&mut self, old: &TickerSymbol, new: TickerSymbol) -> StoreResult<()> {
        self.modify(|set| rename_in(set, old, new))
    }

    fn remove(&mut self, symbol: &TickerSymbol) -> StoreResult<()> {
        self.modify(|set| remove_from(set, symbol))
    }
}
