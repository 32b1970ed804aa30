//! Test case loading utilities for integration tests.
//!
//! For assertion helpers, use `lgbm_leaves::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use lgbm_leaves::testing::{TestExpected, TestInput};
use lgbm_leaves::GbdtModel;

#[allow(unused_imports)]
pub use lgbm_leaves::assert_approx_eq_f64;
#[allow(unused_imports)]
pub use lgbm_leaves::testing::{assert_batch_predictions_match, DEFAULT_TOLERANCE};

/// Base directory for LightGBM inference cases.
pub fn lightgbm_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases/lightgbm/inference")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

/// A model with its input rows and expected outputs.
pub struct TestCase {
    pub name: String,
    pub model: GbdtModel,
    pub rows: Vec<Vec<f64>>,
    pub expected: TestExpected,
}

/// Load `<case>/{model.txt,input.json,expected.json}`.
pub fn load_case(name: &str) -> TestCase {
    let dir = lightgbm_cases_dir().join(name);
    let model = GbdtModel::from_lightgbm_file(dir.join("model.txt"))
        .unwrap_or_else(|e| panic!("Failed to load model for {name}: {e}"));
    let input: TestInput = load_json(&dir.join("input.json"));
    let expected: TestExpected = load_json(&dir.join("expected.json"));

    TestCase {
        name: name.to_string(),
        model,
        rows: input.to_rows(),
        expected,
    }
}

/// Every case directory name.
pub const ALL_CASES: &[&str] = &["numeric", "missing", "categorical", "multiclass", "smoke"];
