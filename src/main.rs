use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;

use billing_data_tools::{
    load_patients, load_payment_records, write_billing_script, BillingSynthesizer,
};

fn main() -> Result<()> {
    // Fixed input directory shared with validate-csv
    let csv_dir = Path::new("csv_generated");

    let patients = load_patients(&csv_dir.join("patients.csv"))?;
    let records = load_payment_records(&csv_dir.join("payment_records.csv"))?;

    let mut synthesizer = BillingSynthesizer::new(rand::thread_rng());
    let rows = synthesizer.synthesize(&patients, &records)?;

    // stdout carries nothing but the SQL script
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_billing_script(&mut out, &rows)?;
    out.flush()?;

    Ok(())
}
