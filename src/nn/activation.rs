//! Hidden-layer activation functions.
//!
//! # References
//!
//! - Nair, V., & Hinton, G. E. (2010). Rectified linear units improve restricted
//!   Boltzmann machines. ICML.
//! - Clevert, D.-A., et al. (2016). Fast and accurate deep network learning by
//!   exponential linear units (ELUs). ICLR.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NngaError, Result};

/// Activation applied after every hidden layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Logistic sigmoid: 1 / (1 + e^-x)
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
    /// max(0, x)
    Relu,
    /// x for x > 0, e^x - 1 otherwise (α = 1)
    Elu,
}

impl Activation {
    /// All activations in grid order.
    pub const ALL: [Self; 4] = [Self::Sigmoid, Self::Tanh, Self::Relu, Self::Elu];

    /// Parses a grid name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for unknown names.
    ///
    /// # Example
    ///
    /// ```
    /// use nnga::nn::Activation;
    ///
    /// assert_eq!(Activation::parse("ReLU").unwrap(), Activation::Relu);
    /// assert!(Activation::parse("softmax").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                NngaError::invalid_param("activation", name, "one of sigmoid, tanh, relu, elu")
            })
    }

    /// Grid name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Relu => "relu",
            Self::Elu => "elu",
        }
    }

    /// Applies the activation to a pre-activation value.
    #[must_use]
    pub fn apply(self, z: f32) -> f32 {
        match self {
            Self::Sigmoid => sigmoid(z),
            Self::Tanh => z.tanh(),
            Self::Relu => z.max(0.0),
            Self::Elu => {
                if z > 0.0 {
                    z
                } else {
                    z.exp_m1()
                }
            }
        }
    }

    /// Derivative expressed through the activation's own output `a`.
    ///
    /// All four functions are monotone, so `a` determines the slope.
    #[must_use]
    pub fn derivative(self, a: f32) -> f32 {
        match self {
            Self::Sigmoid => a * (1.0 - a),
            Self::Tanh => 1.0 - a * a,
            Self::Relu => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Elu => {
                if a > 0.0 {
                    1.0
                } else {
                    a + 1.0
                }
            }
        }
    }

    /// Whether He (Kaiming) initialization suits this activation better
    /// than Xavier.
    #[must_use]
    pub(crate) fn prefers_he_init(self) -> bool {
        matches!(self, Self::Relu | Self::Elu)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numerically stable logistic sigmoid.
#[must_use]
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_symmetry_and_extremes() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-6);
        assert!(sigmoid(-200.0).is_finite());
        assert!((sigmoid(200.0) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn test_apply_values() {
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Relu.apply(2.5), 2.5);
        assert!((Activation::Elu.apply(-1.0) - (-0.632_120_6)).abs() < 1e-6);
        assert!((Activation::Tanh.apply(0.5) - 0.5_f32.tanh()).abs() < 1e-7);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let h = 1e-3;
        for act in Activation::ALL {
            for &z in &[-1.5_f32, -0.3, 0.4, 1.7] {
                let numeric = (act.apply(z + h) - act.apply(z - h)) / (2.0 * h);
                let analytic = act.derivative(act.apply(z));
                assert!(
                    (numeric - analytic).abs() < 1e-2,
                    "{act} at {z}: {numeric} vs {analytic}"
                );
            }
        }
    }

    #[test]
    fn test_parse_all_names() {
        for act in Activation::ALL {
            assert_eq!(Activation::parse(act.as_str()).expect("known"), act);
        }
        assert!(matches!(
            Activation::parse("gelu"),
            Err(NngaError::InvalidHyperparameter { .. })
        ));
    }
}
