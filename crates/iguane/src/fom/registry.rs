use std::str::FromStr;

use crate::error::IguaneError;
use crate::fom::weights::{self, DEFAULT_UGR_VERSION, IGUANE_WEIGHTS};
use crate::spec::{Field, SpecTable, builtin_table};

/// Signature shared by every figure-of-merit evaluator.
pub type Evaluator = fn(&SpecTable, &str, &FomArgs) -> Result<f64, IguaneError>;

/// The registered figures of merit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fom {
    Count,
    Fp16,
    Fp32,
    Fp64,
    Tf32,
    Ugr,
    Iguane,
}

impl Fom {
    pub const ALL: [Self; 7] = [
        Self::Count,
        Self::Fp16,
        Self::Fp32,
        Self::Fp64,
        Self::Tf32,
        Self::Ugr,
        Self::Iguane,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Fp16 => "fp16",
            Self::Fp32 => "fp32",
            Self::Fp64 => "fp64",
            Self::Tf32 => "tf32",
            Self::Ugr => "ugr",
            Self::Iguane => "iguane",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Count => "one unit per GPU",
            Self::Fp16 => "FP16 TFLOPS, FP32 when unpublished",
            Self::Fp32 => "FP32 TFLOPS",
            Self::Fp64 => "FP64 TFLOPS",
            Self::Tf32 => "TF32 TFLOPS, FP32 when unsupported",
            Self::Ugr => "Unified GPU Rating relative to A100-SXM4-40GB",
            Self::Iguane => "equal-weight blend relative to A100-SXM4-80GB",
        }
    }

    pub fn evaluator(self) -> Evaluator {
        match self {
            Self::Count => fom_count,
            Self::Fp16 => fom_fp16,
            Self::Fp32 => fom_fp32,
            Self::Fp64 => fom_fp64,
            Self::Tf32 => fom_tf32,
            Self::Ugr => fom_ugr,
            Self::Iguane => fom_iguane,
        }
    }

    /// Whether the formula reads [`FomArgs::ugr_version`].
    pub fn uses_ugr_version(self) -> bool {
        self == Self::Ugr
    }
}

impl std::fmt::Display for Fom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Fom {
    type Err = IguaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fom| fom.name() == s)
            .ok_or_else(|| IguaneError::UnknownFormula(s.to_string()))
    }
}

/// Formula-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FomArgs {
    /// UGR weight-set version, see [`weights::ugr_versions`].
    pub ugr_version: String,
}

impl Default for FomArgs {
    fn default() -> Self {
        Self {
            ugr_version: DEFAULT_UGR_VERSION.to_string(),
        }
    }
}

impl FomArgs {
    pub fn with_ugr_version(version: impl Into<String>) -> Self {
        Self {
            ugr_version: version.into(),
        }
    }
}

fn fom_count(_: &SpecTable, _: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    Ok(1.0)
}

fn fom_fp16(table: &SpecTable, gpu: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    table.record(gpu)?.require(Field::Fp16)
}

fn fom_fp32(table: &SpecTable, gpu: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    table.record(gpu)?.require(Field::Fp32)
}

fn fom_fp64(table: &SpecTable, gpu: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    table.record(gpu)?.require(Field::Fp64)
}

fn fom_tf32(table: &SpecTable, gpu: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    table.record(gpu)?.require(Field::Tf32)
}

fn fom_ugr(table: &SpecTable, gpu: &str, args: &FomArgs) -> Result<f64, IguaneError> {
    weights::ugr_weights(&args.ugr_version)?.score(table, gpu)
}

fn fom_iguane(table: &SpecTable, gpu: &str, _: &FomArgs) -> Result<f64, IguaneError> {
    IGUANE_WEIGHTS.score(table, gpu)
}

/// The formula set bound to one read-only [`SpecTable`].
#[derive(Debug, Clone, Copy)]
pub struct FomRegistry<'a> {
    table: &'a SpecTable,
}

impl<'a> FomRegistry<'a> {
    pub fn new(table: &'a SpecTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SpecTable {
        self.table
    }

    /// Registered formula names, in registration order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Fom::ALL.into_iter().map(Fom::name)
    }

    pub fn lookup(name: &str) -> Result<Fom, IguaneError> {
        name.parse()
    }

    /// Score `gpu` with the formula called `fom`.
    ///
    /// `args` defaults to [`FomArgs::default`] when absent.
    pub fn evaluate(
        &self,
        fom: &str,
        gpu: &str,
        args: Option<&FomArgs>,
    ) -> Result<f64, IguaneError> {
        self.score(Self::lookup(fom)?, gpu, args)
    }

    pub fn score(&self, fom: Fom, gpu: &str, args: Option<&FomArgs>) -> Result<f64, IguaneError> {
        let default_args;
        let args = match args {
            Some(args) => args,
            None => {
                default_args = FomArgs::default();
                &default_args
            }
        };
        let score = (fom.evaluator())(self.table, gpu, args)?;
        tracing::trace!(%fom, gpu, score, "evaluated figure of merit");
        Ok(score)
    }

    /// Score every GPU in the table, in name order.
    ///
    /// Per-GPU failures (e.g. `fp64` on a GPU without published FP64) are
    /// kept alongside the successes. A bad `args` fails the whole call.
    pub fn score_all(
        &self,
        fom: Fom,
        args: Option<&FomArgs>,
    ) -> Result<Vec<(&'a str, Result<f64, IguaneError>)>, IguaneError> {
        if fom.uses_ugr_version()
            && let Some(args) = args
        {
            weights::ugr_weights(&args.ugr_version)?;
        }
        Ok(self
            .table
            .names()
            .map(|gpu| (gpu, self.score(fom, gpu, args)))
            .collect())
    }
}

impl FomRegistry<'static> {
    /// Registry over the bundled table.
    pub fn builtin() -> Result<Self, IguaneError> {
        Ok(Self::new(builtin_table()?))
    }
}
