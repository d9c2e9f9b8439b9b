// batch.rs
// Phase 3: Drive the input CSV through analysis and write the output

use std::error::Error;
use std::path::Path;

use csv::StringRecord;

use crate::backend::Backend;
use crate::pipeline::analyze::{analyze_description, Verdict};
use crate::pipeline::glossary::Glossary;

const NAME_COLUMN: &str = "feature_name";
const DESCRIPTION_COLUMN: &str = "feature_description";
const RESULT_COLUMNS: [&str; 3] = [
    "is_geo_compliance_needed",
    "reasoning",
    "relevant_regulation",
];

/// Counters for the run, printed at the end.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub analyzed: usize,
    pub skipped: usize,
}

/// Process the whole input file sequentially and write the augmented CSV.
///
/// A missing input file is fatal and nothing is written. Per-row backend
/// failures surface as null verdicts in the output; the batch always runs to
/// completion once the input has been read.
pub async fn run(
    backend: &Backend,
    glossary: &Glossary,
    input: &Path,
    output: &Path,
) -> Result<BatchSummary, Box<dyn Error>> {
    if !input.exists() {
        return Err(format!("Input file not found at '{}'", input.display()).into());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(input)?;
    let headers = reader.headers()?.clone();

    let name_idx = headers
        .iter()
        .position(|h| h == NAME_COLUMN)
        .ok_or_else(|| format!("Input file is missing the '{NAME_COLUMN}' column"))?;
    let desc_idx = headers
        .iter()
        .position(|h| h == DESCRIPTION_COLUMN)
        .ok_or_else(|| format!("Input file is missing the '{DESCRIPTION_COLUMN}' column"))?;

    // Read everything up front so progress can report i/N.
    let rows: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let total = rows.len();
    println!("Starting analysis of {total} features...");

    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };
    let mut results: Vec<StringRecord> = Vec::with_capacity(total);

    for (i, row) in rows.iter().enumerate() {
        let name = row.get(name_idx).unwrap_or("N/A");
        let description = row.get(desc_idx).unwrap_or("");

        println!("[{}/{}] Analyzing feature: '{}'...", i + 1, total, name);

        let verdict = if description.trim().is_empty() {
            println!("  -> Skipping feature '{name}' due to empty description.");
            summary.skipped += 1;
            Verdict::skipped()
        } else {
            summary.analyzed += 1;
            analyze_description(backend, glossary, description).await
        };

        results.push(merge_row(row, headers.len(), &verdict));
    }

    let mut writer = csv::Writer::from_path(output)?;
    let mut out_header = headers.clone();
    for column in RESULT_COLUMNS {
        out_header.push_field(column);
    }
    writer.write_record(&out_header)?;
    for record in &results {
        writer.write_record(record)?;
    }
    writer.flush()?;

    println!("\nAnalysis complete. Results saved to '{}'", output.display());
    Ok(summary)
}

/// Original fields in original order, padded to the header width, plus the
/// three verdict columns.
fn merge_row(row: &StringRecord, width: usize, verdict: &Verdict) -> StringRecord {
    let mut merged = StringRecord::new();
    for field in row.iter().take(width) {
        merged.push_field(field);
    }
    for _ in row.len()..width {
        merged.push_field("");
    }
    merged.push_field(flag_cell(verdict.is_geo_compliance_needed));
    merged.push_field(&verdict.reasoning);
    merged.push_field(&verdict.relevant_regulation);
    merged
}

/// CSV rendering of the tri-state flag: empty cell for null.
fn flag_cell(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "true",
        Some(false) => "false",
        None => "",
    }
}
