//! Reference-relative weight sets.
//!
//! A [`WeightSet`] scores a GPU as `Σ w[a] * (gpu[a] / reference[a])`
//! over its attributes, with `fp16`/`tf32` falling back to `fp32` on
//! both sides of the ratio.

use crate::error::IguaneError;
use crate::spec::{Field, HardwareRecord, SpecTable};

/// Reference GPU of the UGR family.
pub const UGR_REFERENCE: &str = "A100-SXM4-40GB";

/// Reference GPU of the `iguane` formula.
pub const IGUANE_REFERENCE: &str = "A100-SXM4-80GB";

pub const DEFAULT_UGR_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSet {
    pub version: &'static str,
    pub reference: &'static str,
    pub weights: &'static [(Field, f64)],
    /// Normalized sets sum to 1.0, so the reference scores exactly 1.
    pub normalized: bool,
}

/// UGR 1.0, the Alliance allocation unit: the reference scores 4.0.
pub const UGR_V1: WeightSet = WeightSet {
    version: "1.0",
    reference: UGR_REFERENCE,
    weights: &[(Field::Fp16, 1.6), (Field::Fp32, 1.6), (Field::Memgb, 0.8)],
    normalized: false,
};

/// UGR 1.0 scaled by 1/4 so the reference scores 1.0.
pub const UGR_V1_RENORM: WeightSet = WeightSet {
    version: "1.0-renorm",
    reference: UGR_REFERENCE,
    weights: &[(Field::Fp16, 0.4), (Field::Fp32, 0.4), (Field::Memgb, 0.2)],
    normalized: true,
};

pub const UGR_VERSIONS: [WeightSet; 2] = [UGR_V1, UGR_V1_RENORM];

pub const IGUANE_WEIGHTS: WeightSet = WeightSet {
    version: "1.0",
    reference: IGUANE_REFERENCE,
    weights: &[
        (Field::Fp16, 0.2),
        (Field::Fp32, 0.2),
        (Field::Tf32, 0.2),
        (Field::Memgb, 0.2),
        (Field::Membw, 0.2),
    ],
    normalized: true,
};

/// Every weight set a formula can use, for integrity checks.
pub fn all_weight_sets() -> impl Iterator<Item = (&'static str, WeightSet)> {
    UGR_VERSIONS
        .into_iter()
        .map(|w| ("ugr", w))
        .chain(std::iter::once(("iguane", IGUANE_WEIGHTS)))
}

/// Look up a UGR weight set by version name.
pub fn ugr_weights(version: &str) -> Result<WeightSet, IguaneError> {
    UGR_VERSIONS
        .into_iter()
        .find(|w| w.version == version)
        .ok_or_else(|| IguaneError::UnknownWeightVersion(version.to_string()))
}

pub fn ugr_versions() -> impl Iterator<Item = &'static str> {
    UGR_VERSIONS.into_iter().map(|w| w.version)
}

impl WeightSet {
    pub fn total(&self) -> f64 {
        self.weights.iter().map(|(_, w)| w).sum()
    }

    /// Score `gpu` against this set's reference GPU in `table`.
    pub fn score(&self, table: &SpecTable, gpu: &str) -> Result<f64, IguaneError> {
        let record = table.record(gpu)?;
        let reference = table.record(self.reference)?;
        self.score_records(record, reference)
    }

    /// Weighted sum of ratios, summed in declaration order.
    pub fn score_records(
        &self,
        record: &HardwareRecord,
        reference: &HardwareRecord,
    ) -> Result<f64, IguaneError> {
        let mut total = 0.0;
        for &(field, weight) in self.weights {
            let value = record.require(field)?;
            let denominator = reference.require(field)?;
            if denominator == 0.0 {
                return Err(IguaneError::DivisionByZero {
                    reference: reference.name.clone(),
                    field: field.to_string(),
                });
            }
            total += weight * (value / denominator);
            if !total.is_finite() {
                return Err(IguaneError::RatioOverflow {
                    gpu: record.name.clone(),
                    reference: reference.name.clone(),
                    field: field.to_string(),
                });
            }
        }
        Ok(total)
    }
}
