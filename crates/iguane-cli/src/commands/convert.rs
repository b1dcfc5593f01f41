use std::path::Path;

use iguane::spec::parse_table;

/// Re-emit `input` as JSON, to `output` or stdout.
pub fn run(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = parse_table(input)?;
    let mut json = table.to_json_pretty()?;
    json.push('\n');

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(
                input = %input.display(),
                output = %path.display(),
                gpus = table.len(),
                "converted"
            );
        }
        None => print!("{json}"),
    }
    Ok(())
}
