use std::path::Path;

use iguane::spec::SpecTable;

use super::load_table;

pub fn run(gpu: &str, data: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(data)?;
    println!("{}", render(&table, gpu)?);
    Ok(())
}

/// `{ "<gpu>": { ...record... } }`, the same shape as the JSON data file.
fn render(table: &SpecTable, gpu: &str) -> Result<String, Box<dyn std::error::Error>> {
    let record = table.record(gpu)?;
    let mut object = serde_json::Map::new();
    object.insert(gpu.to_string(), serde_json::to_value(record)?);
    Ok(serde_json::to_string_pretty(&object)?)
}
