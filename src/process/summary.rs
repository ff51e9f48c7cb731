use crate::error::ProcessError;
use crate::process::{ColumnSums, DeviceNames, Layout, OutputMode};
use crate::table::RawTable;

/// Reshape aggregated sums into the output table.
pub fn shape_output(
    sums: &ColumnSums,
    names: &DeviceNames,
    input: &RawTable,
    layout: &Layout,
    mode: OutputMode,
) -> Result<RawTable, ProcessError> {
    match mode {
        OutputMode::PerDevice => per_device(sums, names, input, layout),
        OutputMode::AppendSummary => Ok(append_summary(sums, input, layout)),
    }
}

/// One row per device, then a blank separator and the reading period dates
/// pulled from fixed rows of the input.
fn per_device(
    sums: &ColumnSums,
    names: &DeviceNames,
    input: &RawTable,
    layout: &Layout,
) -> Result<RawTable, ProcessError> {
    let start_date = date_cell(input, layout.start_date_row)?;
    let end_date = date_cell(input, layout.end_date_row)?;

    let mut rows = Vec::with_capacity(names.len() + 4);
    rows.push(vec![
        "A/C Unit No.".to_string(),
        "Device Name".to_string(),
        "Sum".to_string(),
    ]);
    for (j, name) in names.iter().enumerate() {
        let total = sums.get(j + layout.data_col_start).copied().unwrap_or(0.0);
        rows.push(vec![(j + 1).to_string(), name.clone(), total.to_string()]);
    }
    rows.push(Vec::new());
    rows.push(vec!["Start Date".to_string(), start_date]);
    rows.push(vec!["End Date".to_string(), end_date]);

    Ok(RawTable::new(rows))
}

fn date_cell(input: &RawTable, index: usize) -> Result<String, ProcessError> {
    match input.rows.get(index) {
        Some(row) => Ok(row.first().cloned().unwrap_or_default()),
        None => Err(ProcessError::OutOfRange {
            index,
            rows: input.rows.len(),
        }),
    }
}

/// The input table with one trailing summary row: the label region stays
/// empty apart from a `Sum` marker, then each data column's total.
fn append_summary(sums: &ColumnSums, input: &RawTable, layout: &Layout) -> RawTable {
    let mut rows = input.rows.clone();

    let mut summary = vec![String::new(); layout.data_col_start];
    summary.push("Sum".to_string());
    summary.extend(sums.iter().skip(layout.data_col_start).map(f64::to_string));
    rows.push(summary);

    RawTable::new(rows)
}
