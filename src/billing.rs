// 💰 Billing Synthesis Engine
// Joins patients to payment records and derives the insurance/billing fields
// the destination table needs but the CSV exports do not carry

use crate::loader::{Patient, PaymentRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime};
use rand::Rng;
use std::collections::HashMap;

// ============================================================================
// DERIVED RECORD
// ============================================================================

/// One fully derived row for the billing_and_insurance table.
/// Field order mirrors the destination column order.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    pub patient_id: u32,
    pub patient_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub insurance_provider: String,
    pub policy_number: u32,
    pub billing_number: String,
    pub admission_date: String,
    pub discharge_date: String,
    pub service_description: String,
    pub total_charges: f64,
    pub coverage_percentage: f64,
    pub coverage_amount: f64,
    pub amount_paid: f64,
    pub running_balance: f64,
    pub payment_status: String,
}

// ============================================================================
// FIXED LOOKUP DATA
// ============================================================================

// Gender here is synthetic placeholder data for a sample table, derived from
// a small closed name list with a coin-flip fallback. It is not an identity
// assertion and must not be read as one.
const MALE_GIVEN_NAMES: [&str; 10] = [
    "John", "James", "Michael", "David", "Robert", "William", "Richard", "Joseph", "Thomas",
    "Charles",
];
const FEMALE_GIVEN_NAMES: [&str; 10] = [
    "Maria", "Jane", "Emily", "Lisa", "Sarah", "Jennifer", "Michelle", "Amanda", "Stephanie",
    "Angela",
];

/// Map a CSV payment status onto the destination table's status vocabulary.
/// Unknown statuses fall back to "Unpaid".
pub fn map_payment_status(status: &str) -> &'static str {
    match status {
        "completed" => "Paid",
        "pending" => "Partially Paid",
        "failed" => "Unpaid",
        _ => "Unpaid",
    }
}

// ============================================================================
// DATE ARITHMETIC
// ============================================================================

/// Shift an ISO-8601 admission timestamp forward by `days` days.
///
/// A trailing `Z` is treated as an explicit zero offset. Offset-bearing
/// timestamps come back as RFC 3339 text; naive timestamps (with either a
/// `T` or a space separator) come back naive with a `T` separator.
pub fn discharge_after(admission: &str, days: i64) -> Result<String> {
    let normalized = admission.trim().replace('Z', "+00:00");

    if let Ok(stamp) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok((stamp + Duration::days(days)).to_rfc3339());
    }

    let naive = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f"))
        .with_context(|| format!("Unparseable admission timestamp {:?}", admission))?;
    Ok((naive + Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%S%.f")
        .to_string())
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// Derives billing rows from joined patient + payment data.
///
/// Generic over the random source so runs can be reproduced: binaries pass
/// `rand::thread_rng()`, tests pass a seeded `StdRng`.
pub struct BillingSynthesizer<R: Rng> {
    rng: R,
    next_record: u32,
}

impl<R: Rng> BillingSynthesizer<R> {
    pub fn new(rng: R) -> Self {
        BillingSynthesizer {
            rng,
            next_record: 1,
        }
    }

    /// Guess a gender label from the first given name.
    /// Names outside the two fixed lists get a fair coin flip.
    pub fn guess_gender(&mut self, full_name: &str) -> &'static str {
        let first = full_name.split_whitespace().next().unwrap_or("");
        if MALE_GIVEN_NAMES.contains(&first) {
            "Male"
        } else if FEMALE_GIVEN_NAMES.contains(&first) {
            "Female"
        } else if self.rng.gen_bool(0.5) {
            "Male"
        } else {
            "Female"
        }
    }

    /// Sample a coverage percentage for the status, then price the covered
    /// amount off the unrounded percentage.
    ///
    /// Returns (percentage rounded to 1 dp, amount rounded to 2 dp).
    pub fn insurance_coverage(&mut self, total_charges: f64, status: &str) -> (f64, f64) {
        let pct = match status {
            "completed" => self.rng.gen_range(70.0..=95.0),
            "pending" => self.rng.gen_range(60.0..=85.0),
            "failed" => self.rng.gen_range(0.0..=50.0),
            _ => self.rng.gen_range(50.0..=90.0),
        };
        let amount = total_charges * (pct / 100.0);
        (round1(pct), round2(amount))
    }

    /// Amount actually paid, by status: completed pays in full, pending pays
    /// a 10-50% fraction, anything else pays nothing.
    pub fn amount_paid(&mut self, total_charges: f64, status: &str) -> f64 {
        match status {
            "completed" => total_charges,
            "pending" => round2(total_charges * self.rng.gen_range(0.1..=0.5)),
            _ => 0.0,
        }
    }

    /// Join each payment record to its patient and derive one billing row.
    ///
    /// Records whose patient id has no match are skipped, not errored, and do
    /// not consume a billing-number sequence value. An unparseable admission
    /// timestamp aborts the whole run.
    pub fn synthesize(
        &mut self,
        patients: &HashMap<u32, Patient>,
        records: &[PaymentRecord],
    ) -> Result<Vec<BillingRecord>> {
        let mut rows = Vec::new();

        for record in records {
            let Some(patient) = patients.get(&record.patient_id) else {
                continue;
            };

            let gender = self.guess_gender(&patient.name);
            let policy_number = self.rng.gen_range(100_000_000..=999_999_999u32);
            let billing_number = format!(
                "BILL-2024-{:04}-{:02}",
                record.patient_id, self.next_record
            );
            let days_stay = self.rng.gen_range(1..=7);
            let discharge_date = discharge_after(&record.admission_date, days_stay)?;
            let (coverage_percentage, coverage_amount) =
                self.insurance_coverage(record.total_charges, &record.payment_status);
            let amount_paid = self.amount_paid(record.total_charges, &record.payment_status);
            let running_balance = record.total_charges - amount_paid;

            rows.push(BillingRecord {
                patient_id: record.patient_id,
                patient_name: patient.name.clone(),
                date_of_birth: patient.date_of_birth.clone(),
                gender: gender.to_string(),
                address: patient.address.clone(),
                phone_number: patient.phone.clone(),
                email: patient.email.clone(),
                insurance_provider: record.insurance_provider.clone(),
                policy_number,
                billing_number,
                admission_date: record.admission_date.clone(),
                discharge_date,
                service_description: record.service.clone(),
                total_charges: record.total_charges,
                coverage_percentage,
                coverage_amount,
                amount_paid,
                running_balance,
                payment_status: map_payment_status(&record.payment_status).to_string(),
            });
            self.next_record += 1;
        }

        Ok(rows)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================
