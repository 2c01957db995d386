//! Competing-hazard abundance update.
//!
//! Abundance `N` is lost to mortality (μ) and to stage transition (σ) at the
//! same time. Individuals that transition accumulate in `N_trans` until they
//! are split off, and keep dying at μ meanwhile:
//!
//! ```text
//! dN/dt       = -(μ + σ) N
//! dN_trans/dt =  σ N - μ N_trans
//! ```
//!
//! The system is linear with constant coefficients over a step, so the exact
//! solution is used. An explicit Euler step would bias large timesteps.

use crate::context::SECONDS_PER_DAY;
use crate::stages::FloorPolicy;

/// Abundance below which an entity is dead.
pub const ABUNDANCE_FLOOR: f64 = 0.01;

/// `(number, num_trans)` after `dt` seconds at mortality `mu` and transition rate `sigma` (per day).
///
/// `number` never increases and `num_trans` stays non-negative for
/// `dt >= 0`, `mu >= 0`, `sigma >= 0`. With `mu + sigma == 0` nothing changes.
pub fn competing_hazard(number: f64, num_trans: f64, mu: f64, sigma: f64, dt: f64) -> (f64, f64) {
    let lambda = mu + sigma;
    let days = dt / SECONDS_PER_DAY;
    let survival = (-days * lambda).exp();
    let num_trans = if lambda > 0.0 {
        num_trans * (-days * mu).exp() + (sigma / lambda) * number * (1.0 - survival)
    } else {
        num_trans
    };
    (number * survival, num_trans)
}

/// Abundance left on an entity that fell below the floor.
///
/// Returns `(number, num_trans)` with `num_trans` always zero.
pub fn settle_floor(number: f64, num_trans: f64, policy: FloorPolicy) -> (f64, f64) {
    match policy {
        FloorPolicy::FoldIntoNumber => (number + num_trans, 0.0),
        FloorPolicy::Discard => (number, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rates_leave_abundance_unchanged() {
        assert_eq!(competing_hazard(100.0, 3.0, 0.0, 0.0, 86_400.0), (100.0, 3.0));
    }

    #[test]
    fn sigma_without_mortality_moves_abundance() {
        // all loss goes to num_trans; total is conserved
        let (n, t) = competing_hazard(100.0, 0.0, 0.0, 0.5, 86_400.0);
        assert!((n - 100.0 * (-0.5_f64).exp()).abs() < 1e-12);
        assert!((n + t - 100.0).abs() < 1e-10);
    }

    #[test]
    fn mortality_only_decays_both() {
        let (n, t) = competing_hazard(100.0, 10.0, 0.2, 0.0, 2.0 * 86_400.0);
        let s = (-0.4_f64).exp();
        assert!((n - 100.0 * s).abs() < 1e-12);
        assert!((t - 10.0 * s).abs() < 1e-12);
    }

    #[test]
    fn floor_policies() {
        let (n, t) = settle_floor(0.005, 0.002, FloorPolicy::FoldIntoNumber);
        assert!((n - 0.007).abs() < 1e-15);
        assert_eq!(t, 0.0);
        assert_eq!(settle_floor(0.005, 0.002, FloorPolicy::Discard), (0.005, 0.0));
    }
}
