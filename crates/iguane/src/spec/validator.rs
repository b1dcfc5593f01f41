use crate::error::{Severity, Violation};
use crate::fom::weights::all_weight_sets;
use crate::spec::types::{Field, SpecTable};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Validate a loaded table for the integrity the formulas rely on.
///
/// Returns a list of violations. If any violation has
/// [`Severity::Error`], some formula cannot be evaluated on this table.
pub fn validate_table(table: &SpecTable) -> Vec<Violation> {
    let mut violations = Vec::new();

    validate_references(table, &mut violations);
    validate_records(table, &mut violations);
    validate_weight_sets(&mut violations);

    violations
}

fn validate_references(table: &SpecTable, violations: &mut Vec<Violation>) {
    let mut checked: Vec<&str> = Vec::new();
    for (formula, set) in all_weight_sets() {
        if checked.contains(&set.reference) {
            continue;
        }
        checked.push(set.reference);

        let Some(reference) = table.get(set.reference) else {
            violations.push(Violation {
                severity: Severity::Error,
                rule: "DATA-001".to_string(),
                message: format!(
                    "reference GPU {} is missing; {formula} cannot be evaluated",
                    set.reference
                ),
                location: Some(set.reference.to_string()),
            });
            continue;
        };

        for field in Field::ALL {
            let used = all_weight_sets()
                .filter(|(_, s)| s.reference == set.reference)
                .any(|(_, s)| s.weights.iter().any(|(f, _)| *f == field));
            if !used {
                continue;
            }
            match reference.get_or_fallback(field) {
                Some(v) if v.is_normal() => {}
                value => violations.push(Violation {
                    severity: Severity::Error,
                    rule: "DATA-002".to_string(),
                    message: format!(
                        "reference GPU {}.{field} is {}; ratios against it are undefined",
                        set.reference,
                        value.map_or_else(|| "None".to_string(), |v| v.to_string())
                    ),
                    location: Some(format!("{}.{field}", set.reference)),
                }),
            }
        }
    }
}

fn validate_records(table: &SpecTable, violations: &mut Vec<Violation>) {
    for record in table.iter() {
        if record.fp32.is_none() {
            violations.push(Violation {
                severity: Severity::Warning,
                rule: "DATA-003".to_string(),
                message: format!(
                    "{}.fp32 is None; fp32 and every fp16/tf32 fallback will fail",
                    record.name
                ),
                location: Some(format!("{}.fp32", record.name)),
            });
        }
        if record.fp64.is_none() {
            violations.push(Violation {
                severity: Severity::Info,
                rule: "DATA-005".to_string(),
                message: format!("{}.fp64 is not published", record.name),
                location: Some(format!("{}.fp64", record.name)),
            });
        }
    }
}

fn validate_weight_sets(violations: &mut Vec<Violation>) {
    for (formula, set) in all_weight_sets() {
        let total = set.total();
        if set.normalized && (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            violations.push(Violation {
                severity: Severity::Warning,
                rule: "DATA-004".to_string(),
                message: format!(
                    "{formula} weights {} sum to {total}, expected 1.0",
                    set.version
                ),
                location: Some(format!("{formula}.{}", set.version)),
            });
        }
    }
}
