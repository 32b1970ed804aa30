use std::path::Path;

use serde::Deserialize;

/// Input rows for a test case, loaded from `input.json`.
///
/// ```json
/// { "features": [[1.0, null], [3.0, 4.0, 5.0]] }
/// ```
///
/// `null` is a missing value (NaN). Rows may differ in length.
#[derive(Debug, Deserialize)]
pub struct TestInput {
    pub features: Vec<Vec<Option<f64>>>,
}

impl TestInput {
    /// Read and parse a JSON input file.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }

    /// Rows with `null` mapped to NaN.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.features
            .iter()
            .map(|row| row.iter().map(|x| x.unwrap_or(f64::NAN)).collect())
            .collect()
    }
}

/// Expected outputs for a test case, loaded from `expected.json`.
///
/// `leaves` is required; score fields are optional and nested per row.
#[derive(Debug, Deserialize)]
pub struct TestExpected {
    pub leaves: Vec<Vec<u32>>,
    #[serde(default)]
    pub raw: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub transformed: Option<Vec<Vec<f64>>>,
}

impl TestExpected {
    /// Read and parse a JSON expectations file.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_nulls_become_nan() {
        let input: TestInput =
            serde_json::from_str(r#"{"features": [[1.0, null], [2.5]]}"#).unwrap();
        let rows = input.to_rows();
        assert_eq!(rows[0][0], 1.0);
        assert!(rows[0][1].is_nan());
        assert_eq!(rows[1], vec![2.5]);
    }

    #[test]
    fn expected_scores_optional() {
        let expected: TestExpected = serde_json::from_str(r#"{"leaves": [[0, 1]]}"#).unwrap();
        assert_eq!(expected.leaves, vec![vec![0, 1]]);
        assert!(expected.raw.is_none());
        assert!(expected.transformed.is_none());
    }
}
