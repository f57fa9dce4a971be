/*!
# Labour Tracker

A browser-based tracker for worker-onboarding records, backed by a single
Google Sheets worksheet.

## Overview

Every record is one sheet row with twelve fixed columns (serial, name,
gender, age, order number, fee, job type, interview flag, first and second
interview time, deposit, remark). The sheet is the only store: the server
keeps no copy of the data between requests.

## Architecture

### Frontend
- **Login page** - username and password form
- **Tracker page** - add-record form plus a full-table grid editor with
  add-row, remove-row, save-all and refresh controls

### Backend
- **Auth gate** - two fixed accounts, cookie sessions held in memory
- **Sheet adapter** - read-all, append-one-row and clear-and-rewrite over the
  worksheet, with header repair and numeric coercion on every read
- **Export** - CSV and XLSX downloads of the current table

## Modules

- **app**: Routing, shared state and the record API handlers
- **login**: Accounts, sessions and the authentication middleware
- **sheets**: Store seam, record-level adapter and the startup connection wrapper
- **google**: Service-account credentials and the Sheets API client
- **table**: Canonical table, schema reconciliation, normalization, sorting
- **record**: Canonical columns and the typed record from the add form
- **cell**: Table values and numeric coercion
- **downloader**: CSV and XLSX export
- **config**: Fixed deployment settings

## REST API Endpoints

- `GET /api/records` - Current table and the pre-filled add-record form
- `POST /api/records` - Append one record
- `PUT /api/records` - Replace the whole sheet with the edited grid
- `GET /api/export/csv`, `GET /api/export/xlsx` - Download the table
*/

pub mod app;
pub mod cell;
pub mod config;
pub mod downloader;
pub mod google;
pub mod login;
pub mod record;
pub mod sheets;
pub mod table;

pub use cell::Cell;
pub use record::{COLUMNS, Record};
pub use sheets::{Connected, SheetAdapter, SheetError, SheetStore};
pub use table::Table;
