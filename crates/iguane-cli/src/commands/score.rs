use std::path::PathBuf;

use iguane::config::{IguaneConfig, load_config};
use iguane::error::IguaneError;
use iguane::fom::{Fom, FomArgs, FomRegistry};

use super::load_table;

/// Flags of `iguane score`; `None` falls back to the config file.
#[derive(Debug, Default)]
pub struct ScoreOptions {
    pub gpus: Vec<String>,
    pub fom: Option<String>,
    pub ugr_version: Option<String>,
    pub data: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

impl ScoreOptions {
    /// Merge flags over the config file over the defaults.
    fn resolve(&self) -> Result<(Fom, FomArgs, Option<PathBuf>), IguaneError> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => IguaneConfig::default(),
        };
        let fom: Fom = self.fom.as_deref().unwrap_or(&config.fom).parse()?;
        let args = FomArgs::with_ugr_version(
            self.ugr_version
                .clone()
                .unwrap_or_else(|| config.ugr_version.clone()),
        );
        let data = self.data.clone().or(config.data);
        Ok((fom, args, data))
    }
}

pub fn run(options: &ScoreOptions) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(options)?);
    Ok(())
}

/// Compute and format the scores requested by `options`.
///
/// Named GPUs must all score; when scoring the whole table, GPUs a
/// formula cannot score (no published FP64, ...) show as `n/a` / `null`.
pub fn render(options: &ScoreOptions) -> Result<String, Box<dyn std::error::Error>> {
    let (fom, args, data) = options.resolve()?;
    let table = load_table(data.as_deref())?;
    let registry = FomRegistry::new(&table);
    tracing::info!(%fom, ugr_version = %args.ugr_version, gpus = options.gpus.len(), "scoring");

    let scores: Vec<(String, Option<f64>)> = if options.gpus.is_empty() {
        registry
            .score_all(fom, Some(&args))?
            .into_iter()
            .map(|(gpu, score)| {
                if let Err(ref e) = score {
                    tracing::debug!(gpu, error = %e, "no score");
                }
                (gpu.to_string(), score.ok())
            })
            .collect()
    } else {
        options
            .gpus
            .iter()
            .map(|gpu| -> Result<(String, Option<f64>), IguaneError> {
                Ok((gpu.clone(), Some(registry.score(fom, gpu, Some(&args))?)))
            })
            .collect::<Result<_, _>>()?
    };

    if options.json {
        let object: serde_json::Map<String, serde_json::Value> = scores
            .into_iter()
            .map(|(gpu, score)| (gpu, score.map_or(serde_json::Value::Null, Into::into)))
            .collect();
        let mut out = serde_json::to_string_pretty(&object)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format_text(fom, &scores))
    }
}

fn format_text(fom: Fom, scores: &[(String, Option<f64>)]) -> String {
    let width = scores
        .iter()
        .map(|(gpu, _)| gpu.len())
        .max()
        .unwrap_or(0)
        .max(3);
    let mut out = format!("{:<width$}  {fom}\n", "GPU");
    for (gpu, score) in scores {
        match score {
            Some(s) => out.push_str(&format!("{gpu:<width$}  {s:.4}\n")),
            None => out.push_str(&format!("{gpu:<width$}  n/a\n")),
        }
    }
    out
}
