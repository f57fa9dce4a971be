//! Access to the backing sheet.
//!
//! [`SheetStore`] is the raw seam: plain string rows in and out. The
//! [`SheetAdapter`] on top of it speaks in [`Table`]s and [`Record`]s and owns
//! the schema repair and numeric coercion rules. [`Connected`] wraps the
//! store built at startup so a failed connection is reported per request.

use log::{info, warn};
use std::future::Future;

use crate::record::{COLUMNS, Record};
use crate::table::Table;

fn canonical_header() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("找不到 service_account.json 文件，也未配置 Secrets。请检查部署设置。")]
    MissingCredentials,

    #[error("凭据格式错误: {0}")]
    InvalidCredentials(String),

    #[error("连接失败: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Startup connection failure, replayed on every operation
    #[error("{0}")]
    NotConnected(String),
}

/// Raw operations on the single worksheet
///
/// Rows are plain string arrays, header row first.
pub trait SheetStore: Send + Sync + 'static {
    /// Every non-empty row of the worksheet
    fn fetch_values(&self) -> impl Future<Output = Result<Vec<Vec<String>>, SheetError>> + Send;

    /// Append one row after the last non-empty row
    fn append_row(&self, row: Vec<String>) -> impl Future<Output = Result<(), SheetError>> + Send;

    /// Remove all values from the worksheet
    fn clear(&self) -> impl Future<Output = Result<(), SheetError>> + Send;

    /// Write `values` starting at the top-left cell
    fn write_values(
        &self,
        values: Vec<Vec<String>>,
    ) -> impl Future<Output = Result<(), SheetError>> + Send;
}

/// Record-level operations over a [`SheetStore`]
pub struct SheetAdapter<S> {
    store: S,
}

impl<S: SheetStore> SheetAdapter<S> {
    pub fn new(store: S) -> Self {
        SheetAdapter { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current table, reconciled to the canonical columns and normalized
    pub async fn read_all(&self) -> Result<Table, SheetError> {
        let values = self.store.fetch_values().await?;
        let table = Table::reconcile_schema(values).normalize();
        info!("Read {} rows from sheet", table.len());
        Ok(table)
    }

    /// Append exactly one row for `record`
    ///
    /// A completely empty sheet gets the canonical header in the same write,
    /// otherwise the new row would be read back as the header.
    pub async fn append(&self, record: &Record) -> Result<(), SheetError> {
        let row = record.to_row();
        if self.store.fetch_values().await?.is_empty() {
            self.store.write_values(vec![canonical_header(), row]).await?;
        } else {
            self.store.append_row(row).await?;
        }
        info!("Appended record {} ({})", record.serial, record.name);
        Ok(())
    }

    /// Replace the whole sheet with the canonical header plus `table`
    ///
    /// Clears first, then writes. If the write fails after the clear the
    /// sheet is left empty.
    pub async fn overwrite(&self, table: &Table) -> Result<(), SheetError> {
        let values = table.to_values();
        self.store.clear().await?;
        if let Err(e) = self.store.write_values(values).await {
            warn!("Sheet cleared but rewrite failed: {}", e);
            return Err(e);
        }
        info!("Overwrote sheet with {} rows", table.len());
        Ok(())
    }
}

/// Store built once at startup, keeping the connection error if there was one
///
/// The server still comes up without a working sheet; every operation then
/// fails with the original connection message so the page can show it.
pub struct Connected<S> {
    inner: Result<S, String>,
}

impl<S: SheetStore> Connected<S> {
    pub fn new(result: Result<S, SheetError>) -> Self {
        Connected {
            inner: result.map_err(|e| e.to_string()),
        }
    }

    fn store(&self) -> Result<&S, SheetError> {
        self.inner
            .as_ref()
            .map_err(|message| SheetError::NotConnected(message.clone()))
    }
}

impl<S: SheetStore> SheetStore for Connected<S> {
    async fn fetch_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        self.store()?.fetch_values().await
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetError> {
        self.store()?.append_row(row).await
    }

    async fn clear(&self) -> Result<(), SheetError> {
        self.store()?.clear().await
    }

    async fn write_values(&self, values: Vec<Vec<String>>) -> Result<(), SheetError> {
        self.store()?.write_values(values).await
    }
}
