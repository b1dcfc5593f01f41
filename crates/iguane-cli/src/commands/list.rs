use std::path::Path;

use iguane::fom::Fom;
use iguane::fom::weights::ugr_versions;

use super::load_table;

pub fn run_fom() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", format_fom_list());
    Ok(())
}

pub fn run_gpu(data: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(data)?;
    for name in table.names() {
        println!("{name}");
    }
    Ok(())
}

fn format_fom_list() -> String {
    let width = Fom::ALL.iter().map(|f| f.name().len()).max().unwrap_or(0);
    let mut out = String::new();
    for fom in Fom::ALL {
        out.push_str(&format!("{:<width$}  {}\n", fom.name(), fom.description()));
        if fom.uses_ugr_version() {
            let versions: Vec<_> = ugr_versions().collect();
            out.push_str(&format!(
                "{:<width$}  versions: {} (--ugr-version)\n",
                "",
                versions.join(", ")
            ));
        }
    }
    out
}
