use std::path::Path;

use iguane::error::{Severity, Violation};
use iguane::spec::validate_table;

use super::load_table;

pub fn run(data: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(data)?;
    let violations = validate_table(&table);
    print!("{}", report(&violations));

    let errors = count(&violations, Severity::Error);
    if errors == 0 {
        Ok(())
    } else {
        Err(format!("GPU data has {errors} validation error(s)").into())
    }
}

fn count(violations: &[Violation], severity: Severity) -> usize {
    violations.iter().filter(|v| v.severity == severity).count()
}

fn report(violations: &[Violation]) -> String {
    let mut out = String::new();
    for v in violations {
        out.push_str(&format!("{v}\n"));
    }
    let errors = count(violations, Severity::Error);
    out.push_str(&format!(
        "\n{errors} error(s), {} warning(s)\n",
        count(violations, Severity::Warning)
    ));
    if errors == 0 {
        out.push_str("GPU data is valid.\n");
    }
    out
}
