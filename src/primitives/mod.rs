//! Core compute primitives (Vector, Matrix).
//!
//! Dense, row-major containers used by the data, metric and network layers.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
