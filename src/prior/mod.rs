//! The q-Generalized Gaussian Markov Random Field (QGGMRF) edge-preserving prior.

use crate::util::{MbirError, MbirResult};

/// QGGMRF shape and scale parameters, shared across the three neighbor buckets
/// (nearest in-plane, diagonal in-plane, interslice) via their respective `b_*`
/// weights applied by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QggmrfParams {
    p: f32,
    q: f32,
    t: f32,
    sigma_x: f32,
}

impl QggmrfParams {
    /// Builds QGGMRF parameters, validating the shape constraints `1 <= p < q` and
    /// positive scale terms.
    pub fn new(p: f32, q: f32, t: f32, sigma_x: f32) -> MbirResult<Self> {
        if !(p.is_finite() && q.is_finite() && t.is_finite() && sigma_x.is_finite()) {
            return Err(MbirError::ParameterError {
                context: "QggmrfParams".into(),
                reason: "p, q, T, and SigmaX must all be finite".into(),
            });
        }
        if !(p >= 1.0 && p < q) {
            return Err(MbirError::ParameterError {
                context: "QggmrfParams".into(),
                reason: format!("require 1 <= p < q, got p={p} q={q}"),
            });
        }
        if t <= 0.0 || sigma_x <= 0.0 {
            return Err(MbirError::ParameterError {
                context: "QggmrfParams".into(),
                reason: "T and SigmaX must be positive".into(),
            });
        }
        Ok(Self { p, q, t, sigma_x })
    }

    /// Shape parameter governing behavior near delta = 0 (the Gaussian-like regime).
    pub fn p(&self) -> f32 {
        self.p
    }

    /// Shape parameter governing behavior for large delta (the edge-preserving regime).
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Threshold (in units of `sigma_x`) separating the two regimes.
    pub fn t(&self) -> f32 {
        self.t
    }

    /// Scale parameter.
    pub fn sigma_x(&self) -> f32 {
        self.sigma_x
    }
}

/// The potential `rho(delta)` for a single voxel pair with difference `delta`.
pub fn potential(delta: f32, params: &QggmrfParams) -> f32 {
    let QggmrfParams { p, q, t, sigma_x } = *params;
    if delta == 0.0 {
        return 0.0;
    }
    let abs_delta = delta.abs();
    let u = (abs_delta / (t * sigma_x)).powf(q - p);
    abs_delta.powf(p) / (p * sigma_x.powf(p)) * (u / (1.0 + u))
}

/// The surrogate coefficient `a(delta)` used to build the quadratic majorizer of
/// the potential around the current voxel difference.
pub fn surrogate_coeff(delta: f32, params: &QggmrfParams) -> f32 {
    let QggmrfParams { p, q, t, sigma_x } = *params;
    if delta == 0.0 {
        return 2.0 / (p * sigma_x.powf(q) * t.powf(q - p));
    }
    let abs_delta = delta.abs();
    let u = (abs_delta / (t * sigma_x)).powf(q - p);
    let numerator = (q / p + u) * abs_delta.powf(p - 2.0) * u;
    let denominator = sigma_x.powf(p) * (1.0 + u).powi(2);
    numerator / denominator
}
