// validate-csv: pre-import referential integrity report over csv_generated/
// Findings are diagnostics only; the process always completes normally.

use billing_data_tools::IntegrityChecker;

fn main() {
    IntegrityChecker::new("csv_generated").run();
}
