// SQL script emission for the billing_and_insurance table

use crate::billing::BillingRecord;
use anyhow::Result;
use std::io::Write;

/// Destination table for the generated script
pub const BILLING_TABLE: &str = "public.billing_and_insurance";

/// Wrap a text value in single quotes for the generated script.
///
/// Embedded apostrophes are passed through as-is; if the inputs ever stop
/// being machine-generated exports, add escaping here and nowhere else.
pub fn quote_text(value: &str) -> String {
    format!("'{value}'")
}

fn value_tuple(record: &BillingRecord) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {:.2}, {:.1}, {:.2}, {:.2}, {:.2}, {})",
        record.patient_id,
        quote_text(&record.patient_name),
        quote_text(&record.date_of_birth),
        quote_text(&record.gender),
        quote_text(&record.address),
        quote_text(&record.phone_number),
        quote_text(&record.email),
        quote_text(&record.insurance_provider),
        record.policy_number,
        quote_text(&record.billing_number),
        quote_text(&record.admission_date),
        quote_text(&record.discharge_date),
        quote_text(&record.service_description),
        record.total_charges,
        record.coverage_percentage,
        record.coverage_amount,
        record.amount_paid,
        record.running_balance,
        quote_text(&record.payment_status),
    )
}

/// Write the full replacement script: clear the table, bulk-insert every
/// derived row, then append two read-only verification queries.
pub fn write_billing_script<W: Write>(out: &mut W, records: &[BillingRecord]) -> Result<()> {
    writeln!(out, "-- Populate {BILLING_TABLE} with synthesized sample data")?;
    writeln!(
        out,
        "-- Derived from CSV exports: patients.csv and payment_records.csv"
    )?;
    writeln!(out)?;

    writeln!(out, "-- Clear existing data")?;
    writeln!(out, "DELETE FROM {BILLING_TABLE};")?;
    writeln!(out)?;

    writeln!(out, "-- Insert billing and insurance data")?;
    writeln!(out, "INSERT INTO {BILLING_TABLE} (")?;
    writeln!(
        out,
        "  \"PatientID\", \"PatientName\", \"DateOfBirth\", \"Gender\", \"Address\","
    )?;
    writeln!(
        out,
        "  \"PhoneNumber\", \"Email\", \"InsuranceProvider\", \"PolicyNumber\","
    )?;
    writeln!(
        out,
        "  \"BillingNumber\", \"AdmissionDate\", \"DischargeDate\", \"ServiceDescription\","
    )?;
    writeln!(
        out,
        "  \"TotalCharges\", \"InsuranceCoveragePercentage\", \"AmountCoveredByInsurance\","
    )?;
    writeln!(out, "  \"AmountPaid\", \"RunningBalance\", \"PaymentStatus\"")?;
    writeln!(out, ") VALUES")?;

    let tuples: Vec<String> = records.iter().map(value_tuple).collect();
    writeln!(out, "{};", tuples.join(",\n"))?;
    writeln!(out)?;

    writeln!(out, "-- Verify the data was inserted")?;
    writeln!(out, "SELECT COUNT(*) as total_records FROM {BILLING_TABLE};")?;
    writeln!(out)?;

    writeln!(out, "-- Show a sample of the inserted data")?;
    writeln!(out, "SELECT")?;
    writeln!(out, "  \"PatientID\",")?;
    writeln!(out, "  \"PatientName\",")?;
    writeln!(out, "  \"ServiceDescription\",")?;
    writeln!(out, "  \"TotalCharges\",")?;
    writeln!(out, "  \"InsuranceProvider\",")?;
    writeln!(out, "  \"PaymentStatus\"")?;
    writeln!(out, "FROM {BILLING_TABLE}")?;
    writeln!(out, "ORDER BY \"PatientID\"")?;
    writeln!(out, "LIMIT 20;")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_billing_record() -> BillingRecord {
        BillingRecord {
            patient_id: 7,
            patient_name: "Ana Cruz".to_string(),
            date_of_birth: "1978-11-03".to_string(),
            gender: "Female".to_string(),
            address: "9 Bonifacio Dr, Cebu City".to_string(),
            phone_number: "+63-917-555-0007".to_string(),
            email: "ana.cruz@example.com".to_string(),
            insurance_provider: "PhilHealth".to_string(),
            policy_number: 123456789,
            billing_number: "BILL-2024-0007-01".to_string(),
            admission_date: "2024-01-01T00:00:00Z".to_string(),
            discharge_date: "2024-01-05T00:00:00+00:00".to_string(),
            service_description: "Emergency Room Care".to_string(),
            total_charges: 15250.5,
            coverage_percentage: 85.0,
            coverage_amount: 12962.93,
            amount_paid: 15250.5,
            running_balance: 0.0,
            payment_status: "Paid".to_string(),
        }
    }

    fn render(records: &[BillingRecord]) -> String {
        let mut buf = Vec::new();
        write_billing_script(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_quote_text_wraps_in_single_quotes() {
        assert_eq!(quote_text("Paid"), "'Paid'");
        // Embedded apostrophes pass through untouched
        assert_eq!(quote_text("O'Brien"), "'O'Brien'");
    }

    #[test]
    fn test_value_tuple_formats_all_19_fields() {
        let tuple = value_tuple(&test_billing_record());
        assert_eq!(
            tuple,
            "(7, 'Ana Cruz', '1978-11-03', 'Female', '9 Bonifacio Dr, Cebu City', \
             '+63-917-555-0007', 'ana.cruz@example.com', 'PhilHealth', 123456789, \
             'BILL-2024-0007-01', '2024-01-01T00:00:00Z', '2024-01-05T00:00:00+00:00', \
             'Emergency Room Care', 15250.50, 85.0, 12962.93, 15250.50, 0.00, 'Paid')"
        );
    }

    #[test]
    fn test_script_layout() {
        let script = render(&[test_billing_record()]);

        assert!(script.contains("DELETE FROM public.billing_and_insurance;"));
        assert!(script.contains("INSERT INTO public.billing_and_insurance ("));
        assert!(script.contains("\"PatientID\", \"PatientName\", \"DateOfBirth\""));
        assert!(script.contains(") VALUES\n(7, 'Ana Cruz'"));
        assert!(script.contains("'Paid');\n"));
        assert!(script
            .contains("SELECT COUNT(*) as total_records FROM public.billing_and_insurance;"));
        assert!(script.contains("ORDER BY \"PatientID\"\nLIMIT 20;"));
    }

    #[test]
    fn test_script_joins_tuples_with_commas() {
        let mut second = test_billing_record();
        second.patient_id = 8;
        second.billing_number = "BILL-2024-0008-02".to_string();

        let script = render(&[test_billing_record(), second]);

        assert!(script.contains("'Paid'),\n(8, 'Ana Cruz'"));
        // Exactly one statement terminator after the tuples
        assert_eq!(script.matches("'Paid');").count(), 1);
    }

    #[test]
    fn test_script_from_fixture_datasets() {
        use crate::billing::BillingSynthesizer;
        use crate::loader::{load_patients, load_payment_records};
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        use std::path::Path;

        let patients = load_patients(Path::new("test_patients.csv")).unwrap();
        let records = load_payment_records(Path::new("test_payment_records.csv")).unwrap();

        let mut synthesizer = BillingSynthesizer::new(StdRng::seed_from_u64(1));
        let rows = synthesizer.synthesize(&patients, &records).unwrap();
        let script = render(&rows);

        // P0099 has no patient row, so only two tuples are emitted
        assert_eq!(rows.len(), 2);
        assert!(script.contains("'BILL-2024-0007-01'"));
        assert!(script.contains("'BILL-2024-0001-02'"));
        assert!(!script.contains("BILL-2024-0099"));
        // completed record pays in full
        assert!(script.contains("15250.50, 0.00, 'Paid')"));
    }

    #[test]
    fn test_script_with_no_records_still_emits_statements() {
        let script = render(&[]);

        assert!(script.contains("DELETE FROM public.billing_and_insurance;"));
        // The VALUES list degenerates to a bare terminator
        assert!(script.contains(") VALUES\n;"));
    }
}
