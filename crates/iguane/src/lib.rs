//! # iguane
//!
//! Figures of merit for heterogeneous GPU clusters.
//!
//! A static table of per-GPU hardware characteristics (throughput at
//! several precisions, memory size, memory bandwidth) feeds a fixed set of
//! scoring formulas. Each formula turns a GPU name into one number usable
//! for capacity planning or fair-share accounting.
//!
//! ```no_run
//! use iguane::fom::{FomArgs, FomRegistry};
//!
//! let registry = FomRegistry::builtin()?;
//! let args = FomArgs::with_ugr_version("1.0-renorm");
//! let score = registry.evaluate("ugr", "H100-SXM5-80GB", Some(&args))?;
//! println!("{score:.3}");
//! # Ok::<(), iguane::error::IguaneError>(())
//! ```
//!
//! ## Modules
//!
//! - [`spec`]: Parse and validate the GPU data file
//! - [`fom`]: Figure-of-merit formulas and their weight sets
//! - [`config`]: YAML configuration for front ends
//! - [`error`]: Error and violation types

pub mod config;
pub mod error;
pub mod fom;
pub mod spec;
