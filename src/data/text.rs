//! Parsing feature rows from delimited text.

/// A cell could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column {column}: cannot parse {value:?} as a number")]
pub struct RowParseError {
    /// Zero-based column of the offending cell.
    pub column: usize,
    /// The cell text, trimmed.
    pub value: String,
}

/// Parse one delimited row of feature values.
///
/// Cells are trimmed. Empty cells and `nan`, `NaN`, `NA`, `null`
/// (any case) parse as `f64::NAN`.
///
/// ```
/// use lgbm_leaves::data::parse_row;
///
/// let row = parse_row("0, 1.5,,NA", ',').unwrap();
/// assert_eq!(row[..2], [0.0, 1.5]);
/// assert!(row[2].is_nan() && row[3].is_nan());
/// ```
pub fn parse_row(line: &str, delimiter: char) -> Result<Vec<f64>, RowParseError> {
    if line.trim().is_empty() {
        return Ok(Vec::new());
    }
    line.split(delimiter)
        .enumerate()
        .map(|(column, cell)| parse_cell(cell.trim()).ok_or_else(|| RowParseError {
            column,
            value: cell.trim().to_string(),
        }))
        .collect()
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.is_empty()
        || ["nan", "na", "null"]
            .iter()
            .any(|m| cell.eq_ignore_ascii_case(m))
    {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers() {
        let row = parse_row("0,1,63733,1111,36112,0,0,1,1", ',').unwrap();
        assert_eq!(row, vec![0.0, 1.0, 63733.0, 1111.0, 36112.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_markers_are_nan() {
        let row = parse_row(" ,nan,NaN,NA,null,-1e3", ',').unwrap();
        assert_eq!(row.len(), 6);
        assert!(row[..5].iter().all(|v| v.is_nan()));
        assert_eq!(row[5], -1000.0);
    }

    #[test]
    fn blank_line_is_empty_row() {
        assert_eq!(parse_row("   ", ',').unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn reports_bad_column() {
        let err = parse_row("1\tx\t3", '\t').unwrap_err();
        assert_eq!(err.column, 1);
        assert_eq!(err.value, "x");
    }
}
