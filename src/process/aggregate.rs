use tracing::debug;

use crate::error::ProcessError;
use crate::process::Layout;
use crate::table::RawTable;

/// Running totals, one per input column. Indices line up with cell indices;
/// entries before `data_col_start` stay at zero.
pub type ColumnSums = Vec<f64>;

/// Device labels from the header row, one per data column, in column order.
/// Name `j` pairs with `ColumnSums[j + data_col_start]`.
pub type DeviceNames = Vec<String>;

/// Structural precondition: the table must reach the device-name header row.
///
/// Deeper rows (the date rows) are only checked when the output shaping
/// actually reads them, so a table that passes here can still fail later with
/// [`ProcessError::OutOfRange`].
pub fn validate_shape(table: &RawTable, layout: &Layout) -> Result<(), ProcessError> {
    let min = layout.min_rows();
    if table.rows.len() < min {
        return Err(ProcessError::InsufficientRows {
            rows: table.rows.len(),
            min,
        });
    }
    Ok(())
}

/// Sum every data column over the data region and pick up the device names.
///
/// An empty or missing cell counts as zero, and so does a cell that fails
/// numeric parsing. Call after [`validate_shape`]; the device-name row must
/// exist.
pub fn aggregate(table: &RawTable, layout: &Layout) -> (ColumnSums, DeviceNames) {
    let columns = table.column_count();
    let mut sums = vec![0.0; columns];

    for row in table.rows.iter().skip(layout.data_row_start) {
        for j in layout.data_col_start..columns {
            if let Some(cell) = row.get(j) {
                // "NaN" parses as a float; it must degrade to zero like any
                // other noise instead of poisoning the column total
                if let Ok(value) = cell.trim().parse::<f64>() {
                    if !value.is_nan() {
                        sums[j] += value;
                    }
                }
            }
        }
    }

    let names: DeviceNames = table.rows[layout.device_name_row]
        .iter()
        .skip(layout.data_col_start)
        .cloned()
        .collect();

    debug!(columns, devices = names.len(), "aggregated data region");
    (sums, names)
}
