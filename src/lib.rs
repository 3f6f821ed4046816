// Billing Data Tools - Core Library
// Shared by the generate-billing-sql and validate-csv binaries and the tests

pub mod billing;
pub mod integrity;
pub mod loader;
pub mod sql;

// Re-export commonly used types
pub use billing::{discharge_after, map_payment_status, BillingRecord, BillingSynthesizer};
pub use integrity::{
    duplicate_values, has_duplicate_values, id_set, load_rows, missing_references, CsvRow,
    IntegrityChecker, MAX_REPORTED, SAMPLE_ROWS,
};
pub use loader::{load_patients, load_payment_records, parse_patient_key, Patient, PaymentRecord};
pub use sql::{quote_text, write_billing_script, BILLING_TABLE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
