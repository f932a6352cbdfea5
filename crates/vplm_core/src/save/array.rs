//! DOE array codec (section 12)
//!
//! Two layouts are understood, detected per `+++` group:
//! - shaped: `shape <rows> <cols>` then one space-separated row per line; an
//!   array without columns is the header alone
//! - legacy: one `[a b c]` row per line, as written by older saves
//!
//! The legacy reader splits on `]\n[` and then on whitespace, so a row the old
//! writer wrapped over several lines is still read as one row. Rows truncated
//! with `...` cannot be recovered and fail as invalid numbers.

use nalgebra::DMatrix;

use super::codec::{fmt_float, parse_float, parse_int};
use super::error::FieldError;
use super::GROUP_SEP;
use crate::config::ArrayLayout;
use crate::doe::DoeBundle;

const SHAPE_TAG: &str = "shape";

pub fn encode_matrix(matrix: &DMatrix<f64>, layout: ArrayLayout) -> String {
    let rows = matrix.row_iter().map(|row| {
        let values: Vec<String> = row.iter().map(|v| fmt_float(*v)).collect();
        values.join(" ")
    });
    match layout {
        ArrayLayout::Shaped => {
            let mut lines = vec![format!("{} {} {}", SHAPE_TAG, matrix.nrows(), matrix.ncols())];
            // Rows without columns are implied by the header
            if matrix.ncols() > 0 {
                lines.extend(rows);
            }
            lines.join("\n")
        }
        ArrayLayout::Legacy => rows.map(|row| format!("[{}]", row)).collect::<Vec<_>>().join("\n"),
    }
}

pub fn encode_bundle(bundle: &DoeBundle, layout: ArrayLayout) -> String {
    if layout == ArrayLayout::Legacy && bundle.iter().any(|matrix| matrix.nrows() == 0) {
        log::warn!(
            "Legacy layout cannot hold an array without rows, the saved DOE will read back empty"
        );
    }
    bundle
        .iter()
        .map(|matrix| encode_matrix(matrix, layout))
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n", GROUP_SEP))
}

pub fn decode_bundle(text: &str) -> Result<DoeBundle, FieldError> {
    let mut arrays = Vec::new();
    for group in text.split(GROUP_SEP) {
        let group = group.trim();
        if group.starts_with(SHAPE_TAG) {
            arrays.push(decode_shaped(group)?);
            continue;
        }
        match decode_legacy(group)? {
            Some(matrix) => arrays.push(matrix),
            // An empty legacy group invalidates the whole bundle
            None => return Ok(DoeBundle::default()),
        }
    }
    Ok(DoeBundle::new(arrays))
}

fn decode_shaped(group: &str) -> Result<DMatrix<f64>, FieldError> {
    let mut lines = group.lines().map(str::trim).filter(|line| !line.is_empty());
    let header = lines.next().unwrap_or_default();
    let dims: Vec<&str> = header.split_whitespace().skip(1).collect();
    let [rows, cols] = dims.as_slice() else {
        return Err(FieldError::Malformed(format!("bad array header {:?}", header)));
    };
    let rows: usize = parse_int(rows)?;
    let cols: usize = parse_int(cols)?;
    let len = rows.checked_mul(cols).ok_or_else(|| {
        FieldError::Malformed(format!("array shape {}x{} is too large", rows, cols))
    })?;

    if cols == 0 {
        if lines.next().is_some() {
            return Err(FieldError::Malformed("values in an array without columns".to_string()));
        }
        return Ok(DMatrix::zeros(rows, 0));
    }

    // Capacity follows the text actually read, never the header
    let mut data = Vec::new();
    let mut found_rows = 0;
    for line in lines {
        let row = parse_row(line)?;
        if row.len() != cols {
            return Err(FieldError::Malformed(format!(
                "array row has {} values, header declares {}",
                row.len(),
                cols
            )));
        }
        data.extend(row);
        found_rows += 1;
    }
    if found_rows != rows || data.len() != len {
        return Err(FieldError::Malformed(format!(
            "array has {} rows, header declares {}",
            found_rows, rows
        )));
    }
    Ok(DMatrix::from_row_slice(rows, cols, &data))
}

fn decode_legacy(group: &str) -> Result<Option<DMatrix<f64>>, FieldError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for chunk in group.split("]\n[") {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let row = parse_row(&chunk.replace(['[', ']'], ""))?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(FieldError::Malformed(format!(
                    "ragged array: rows of {} and {} values",
                    first.len(),
                    row.len()
                )));
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Ok(None);
    }
    log::debug!("Read legacy DOE array of {} rows", rows.len());
    let cols = rows[0].len();
    let data: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Some(DMatrix::from_row_slice(rows.len(), cols, &data)))
}

fn parse_row(line: &str) -> Result<Vec<f64>, FieldError> {
    line.split_whitespace().map(parse_float).collect()
}
