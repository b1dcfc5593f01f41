//! Shared helpers for the table and formula integration tests.
#![allow(dead_code)]

use iguane::spec::{SpecTable, builtin_table};

/// The bundled table; every integration test runs against the shipped data.
pub fn table() -> &'static SpecTable {
    builtin_table().unwrap_or_else(|e| panic!("bundled GPU data must parse: {e}"))
}

/// Every GPU name in the bundled table, sorted.
pub fn gpu_names() -> Vec<&'static str> {
    table().names().collect()
}

/// Asserts `a` and `b` agree to a relative tolerance.
pub fn assert_close(a: f64, b: f64, rel: f64) {
    let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
    assert!(
        (a - b).abs() / scale <= rel,
        "{a} and {b} differ by more than {rel} relative"
    );
}

/// Render one legacy `GPU(...)` record.
pub fn render_record(
    name: &str,
    fp: [Option<f64>; 4],
    memgb: f64,
    membw: f64,
    single_quotes: bool,
    trailing_comma: bool,
) -> String {
    let q = if single_quotes { '\'' } else { '"' };
    let num = |v: Option<f64>| v.map_or_else(|| "None".to_string(), |v| format!("{v:?}"));
    let tail = if trailing_comma { "," } else { "" };
    format!(
        "GPU(name={q}{name}{q}, fp16={}, fp32={}, fp64={}, tf32={}, memgb={memgb:?}, membw={membw:?}{tail})",
        num(fp[0]),
        num(fp[1]),
        num(fp[2]),
        num(fp[3]),
    )
}
