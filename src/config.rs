//! Fixed deployment settings.
//!
//! The backing store identity and every path the server touches are compiled
//! in; nothing here is read from the environment at runtime.

/// Google Sheets spreadsheet that holds the records
pub const SHEET_ID: &str = "15K5LDlpYZtIUoEFfsGMCSZEjgJ7J49F7GlgWThhd2QU";

/// Worksheet used inside the spreadsheet (first tab)
pub const WORKSHEET_INDEX: usize = 0;

/// Nominal name of the worksheet, used only when the API reports no tabs
pub const WORKSHEET_NAME: &str = "Sheet1";

/// Local service-account key file
pub const SERVICE_ACCOUNT_FILE: &str = "service_account.json";

/// Cloud-style secrets bundle, checked before the local key file
pub const SECRETS_FILE: &str = ".streamlit/secrets.toml";

/// Table inside the secrets bundle carrying the service-account key
pub const SECRETS_KEY: &str = "gcp_service_account";

pub const BIND_ADDR: &str = "127.0.0.1:3000";

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Lifetime requested for the signed JWT assertion, in seconds
pub const TOKEN_LIFETIME: i64 = 3600;

/// Refresh an access token this many seconds before it expires
pub const TOKEN_REFRESH_MARGIN: i64 = 60;

pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Add-record form defaults
pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_FEE: f64 = 0.0;
pub const DEFAULT_DEPOSIT: f64 = 0.0;
