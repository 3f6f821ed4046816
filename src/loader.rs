// 📂 CSV Loaders - patients and payment records
// Parses the csv_generated exports into in-memory datasets

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// ============================================================================
// DOMAIN TYPES
// ============================================================================

/// Demographic fields for one patient, keyed externally by parsed id
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub date_of_birth: String,
}

/// One payment record, in input file order
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    pub patient_id: u32,
    pub service: String,
    pub insurance_provider: String,
    pub total_charges: f64,
    pub payment_status: String,
    /// Raw ISO-8601 timestamp text, parsed only when deriving a discharge date
    pub admission_date: String,
}

// Raw CSV rows - field names match the export headers exactly.
// Columns not listed here (e.g. user_id on payment records) are ignored.

#[derive(Debug, Deserialize)]
struct PatientCsvRow {
    patient_id: String,
    full_name: String,
    email: String,
    phone: String,
    address: String,
    date_of_birth: String,
}

#[derive(Debug, Deserialize)]
struct PaymentCsvRow {
    patient_id: String,
    paying_for: String,
    insurance_provider: String,
    total_price_php: String,
    payment_status: String,
    created_at: String,
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse a patient key like "P0007" into 7.
///
/// Strips the `P` prefix and any leading zeros, then parses the remaining
/// digits. A key with no digits left (e.g. "P0000") is an error.
pub fn parse_patient_key(raw: &str) -> Result<u32> {
    let digits = raw.trim().trim_start_matches('P').trim_start_matches('0');
    if digits.is_empty() {
        bail!("Patient key {:?} has no usable digits", raw);
    }
    digits
        .parse::<u32>()
        .with_context(|| format!("Invalid patient key {:?}", raw))
}

// ============================================================================
// LOADERS
// ============================================================================

/// Load patients.csv into a map keyed by parsed patient id
pub fn load_patients(csv_path: &Path) -> Result<HashMap<u32, Patient>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open patients CSV {}", csv_path.display()))?;

    let mut patients = HashMap::new();
    for result in rdr.deserialize() {
        let row: PatientCsvRow = result.context("Failed to deserialize patient row")?;
        let key = parse_patient_key(&row.patient_id)?;
        patients.insert(
            key,
            Patient {
                name: row.full_name,
                email: row.email,
                phone: row.phone,
                address: row.address,
                date_of_birth: row.date_of_birth,
            },
        );
    }

    Ok(patients)
}

/// Load payment_records.csv preserving input row order
pub fn load_payment_records(csv_path: &Path) -> Result<Vec<PaymentRecord>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open payment records CSV {}", csv_path.display()))?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let row: PaymentCsvRow = result.context("Failed to deserialize payment record row")?;
        let patient_id = parse_patient_key(&row.patient_id)?;
        let total_charges = row
            .total_price_php
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid charge amount {:?}", row.total_price_php))?;

        records.push(PaymentRecord {
            patient_id,
            service: row.paying_for,
            insurance_provider: row.insurance_provider,
            total_charges,
            payment_status: row.payment_status,
            admission_date: row.created_at,
        });
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
