mod common;

use common::MemoryStore;
use labour_tracker::record::Gender;
use labour_tracker::{COLUMNS, Cell, Connected, Record, SheetAdapter, SheetError, SheetStore, Table};

fn header_row() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn sample(serial: u32, name: &str) -> Record {
    Record {
        name: name.to_string(),
        gender: Gender::Female,
        fee: 150.5,
        ..Record::draft(serial)
    }
}

/// Cells a fresh read should hold for `record`
fn read_back(record: &Record) -> Vec<Cell> {
    Table::reconcile_schema(vec![header_row(), record.to_row()])
        .normalize()
        .rows
        .remove(0)
}

#[tokio::test]
async fn append_then_read_adds_last_row() {
    let existing = sample(1, "甲");
    let adapter = SheetAdapter::new(MemoryStore::with_values(vec![
        header_row(),
        existing.to_row(),
    ]));

    let record = sample(2, "乙");
    adapter.append(&record).await.unwrap();

    let table = adapter.read_all().await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0], read_back(&existing));
    assert_eq!(table.rows[1], read_back(&record));
    assert_eq!(table.rows[1][5], Cell::Number(150.5));
}

#[tokio::test]
async fn append_to_empty_sheet_writes_header_first() {
    let adapter = SheetAdapter::new(MemoryStore::new());
    let record = sample(1, "甲");

    adapter.append(&record).await.unwrap();

    let stored = adapter.store().snapshot();
    assert_eq!(stored, vec![header_row(), record.to_row()]);
    assert_eq!(adapter.read_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_append_to_empty_sheet_leaves_it_empty() {
    let adapter = SheetAdapter::new(MemoryStore::new());
    adapter.store().set_fail_writes(true);

    assert!(adapter.append(&sample(1, "甲")).await.is_err());
    assert!(adapter.store().snapshot().is_empty());
}

#[tokio::test]
async fn failed_append_leaves_sheet_unchanged() {
    let before = vec![header_row(), sample(1, "甲").to_row()];
    let adapter = SheetAdapter::new(MemoryStore::with_values(before.clone()));
    adapter.store().set_fail_writes(true);

    assert!(adapter.append(&sample(2, "乙")).await.is_err());
    assert_eq!(adapter.store().snapshot(), before);
}

#[tokio::test]
async fn overwrite_is_idempotent() {
    let adapter = SheetAdapter::new(MemoryStore::with_values(vec![
        header_row(),
        sample(1, "甲").to_row(),
        sample(2, "乙").to_row(),
    ]));

    let table = adapter.read_all().await.unwrap();
    adapter.overwrite(&table).await.unwrap();
    let first = adapter.store().snapshot();
    adapter.overwrite(&adapter.read_all().await.unwrap()).await.unwrap();

    assert_eq!(adapter.store().snapshot(), first);
    assert_eq!(adapter.read_all().await.unwrap(), table);
}

#[tokio::test]
async fn overwrite_drops_rows_no_longer_present() {
    let adapter = SheetAdapter::new(MemoryStore::with_values(vec![
        header_row(),
        sample(1, "甲").to_row(),
        sample(2, "乙").to_row(),
        sample(3, "丙").to_row(),
    ]));

    let mut table = adapter.read_all().await.unwrap();
    table.rows.truncate(1);
    adapter.overwrite(&table).await.unwrap();

    let stored = adapter.store().snapshot();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], header_row());
    assert_eq!(stored[1][1], "甲");
}

#[tokio::test]
async fn failed_rewrite_leaves_sheet_cleared() {
    let adapter = SheetAdapter::new(MemoryStore::with_values(vec![
        header_row(),
        sample(1, "甲").to_row(),
    ]));
    let table = adapter.read_all().await.unwrap();
    adapter.store().set_fail_writes(true);

    assert!(adapter.overwrite(&table).await.is_err());
    assert!(adapter.store().snapshot().is_empty());
}

#[tokio::test]
async fn connection_error_is_replayed_on_every_call() {
    let store: Connected<MemoryStore> = Connected::new(Err(SheetError::MissingCredentials));
    let expected = SheetError::MissingCredentials.to_string();

    let err = store.fetch_values().await.unwrap_err();
    assert!(matches!(err, SheetError::NotConnected(_)));
    assert_eq!(err.to_string(), expected);
    assert_eq!(store.append_row(Vec::new()).await.unwrap_err().to_string(), expected);
    assert_eq!(store.clear().await.unwrap_err().to_string(), expected);
    assert_eq!(store.write_values(Vec::new()).await.unwrap_err().to_string(), expected);
}

#[tokio::test]
async fn connected_store_passes_through() {
    let adapter = SheetAdapter::new(Connected::new(Ok(MemoryStore::new())));
    adapter.append(&sample(1, "甲")).await.unwrap();
    assert_eq!(adapter.read_all().await.unwrap().len(), 1);
}
