//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use nnga::prelude::*;
//! ```

pub use crate::automl::{GeneticConfig, GeneticSearch, TaskMode};
pub use crate::data::DataFrame;
pub use crate::error::{NngaError, Result};
pub use crate::metrics::{mae, mse, r_squared};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{Estimator, PipelineAdaptor, Transformer};
