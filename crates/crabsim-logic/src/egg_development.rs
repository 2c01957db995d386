//! Temperature-dependent stochastic egg development.
//!
//! Embryonic development is tracked as a continuous stage index on `[1, 19]`.
//! Each integer stage has its own log development rate (per hour); the rate
//! scales exponentially with temperature and may carry log-normal noise:
//!
//! ```text
//! rate = exp(r0[round(s) - 1] + t_coeff * T + eps),   eps ~ N(0, sigma)
//! s'   = s + rate * dt_hours
//! ```
//!
//! With `sigma == 0` no variate is drawn, so the result is deterministic.

use serde::{Deserialize, Serialize};

use crate::context::RandomSource;
use crate::error::DomainError;

/// Number of embryonic stages in the rate table.
pub const EGG_STAGE_COUNT: usize = 19;

/// Log development rate (ln per hour at 0 °C) for stages 1..=19.
pub const LN_STAGE_RATES: [f64; EGG_STAGE_COUNT] = [
    -3.052159, -3.108432, -3.241877, -3.365210, -3.512004, -3.689310, -3.871245, -4.012876,
    -4.198653, -4.342110, -4.486732, -4.601988, -4.735240, -4.870115, -4.951337, -5.062981,
    -5.174412, -5.301876, -5.448903,
];

/// Parameters of the egg development curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggDevelopment {
    /// Temperature coefficient of the log rate (per °C).
    pub t_coeff: f64,
    /// Standard deviation of the log-rate noise; 0 disables it.
    pub sigma: f64,
    /// Use the in-situ temperature rather than `nominal_temperature`.
    pub use_in_situ: bool,
    /// Temperature used when `use_in_situ` is false (°C).
    pub nominal_temperature: f64,
}

impl Default for EggDevelopment {
    fn default() -> Self {
        Self {
            t_coeff: 0.2153114,
            sigma: 0.0,
            use_in_situ: false,
            nominal_temperature: 3.0,
        }
    }
}

impl EggDevelopment {
    /// Table index for a development stage. Never clamps.
    pub fn stage_index(dev_stage: f64) -> Result<usize, DomainError> {
        let index = dev_stage.round() as i64 - 1;
        if !(0..EGG_STAGE_COUNT as i64).contains(&index) || !dev_stage.is_finite() {
            return Err(DomainError::StageIndexOutOfRange { dev_stage, index });
        }
        Ok(index as usize)
    }

    /// Temperature that drives the rate.
    pub fn effective_temperature(&self, in_situ: f64) -> f64 {
        if self.use_in_situ {
            in_situ
        } else {
            self.nominal_temperature
        }
    }

    /// Development rate (stages per hour) at `dev_stage` and in-situ `temperature`.
    pub fn rate(
        &self,
        dev_stage: f64,
        temperature: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<f64, DomainError> {
        let r0 = LN_STAGE_RATES[Self::stage_index(dev_stage)?];
        let eps = if self.sigma > 0.0 {
            self.sigma * rng.normal()
        } else {
            0.0
        };
        Ok((r0 + self.t_coeff * self.effective_temperature(temperature) + eps).exp())
    }

    /// Development stage after `dt_hours`.
    pub fn advance(
        &self,
        dt_hours: f64,
        dev_stage: f64,
        temperature: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<f64, DomainError> {
        Ok(dev_stage + self.rate(dev_stage, temperature, rng)? * dt_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoDraws;

    impl RandomSource for NoDraws {
        fn normal(&mut self) -> f64 {
            panic!("normal variate drawn with sigma = 0");
        }
        fn uniform(&mut self, _lo: f64, _hi: f64) -> f64 {
            panic!("uniform variate drawn with sigma = 0");
        }
    }

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn normal(&mut self) -> f64 {
            self.0
        }
        fn uniform(&mut self, lo: f64, _hi: f64) -> f64 {
            lo
        }
    }

    #[test]
    fn one_day_at_nominal_three_degrees() {
        let dev = EggDevelopment::default();
        let s = dev.advance(24.0, 1.0, 12.0, &mut NoDraws).unwrap();
        let rate = (-3.052159_f64 + 0.2153114 * 3.0).exp();
        assert!((rate - 0.09016).abs() < 1e-4, "rate={rate}");
        assert!((s - (1.0 + 24.0 * rate)).abs() < 1e-12);
        assert!((s - 3.1637).abs() < 1e-3, "s={s}");
    }

    #[test]
    fn in_situ_temperature_is_used_when_configured() {
        let dev = EggDevelopment {
            use_in_situ: true,
            ..EggDevelopment::default()
        };
        let cold = dev.rate(5.0, 0.0, &mut NoDraws).unwrap();
        let warm = dev.rate(5.0, 4.0, &mut NoDraws).unwrap();
        assert!(warm > cold);
        assert!((cold - LN_STAGE_RATES[4].exp()).abs() < 1e-15);
    }

    #[test]
    fn noise_shifts_log_rate() {
        let dev = EggDevelopment {
            sigma: 0.5,
            ..EggDevelopment::default()
        };
        let base = EggDevelopment::default().rate(2.0, 0.0, &mut NoDraws).unwrap();
        let noisy = dev.rate(2.0, 0.0, &mut Fixed(1.0)).unwrap();
        assert!((noisy / base - 0.5_f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn stage_index_rounds() {
        assert_eq!(EggDevelopment::stage_index(1.0).unwrap(), 0);
        assert_eq!(EggDevelopment::stage_index(1.49).unwrap(), 0);
        assert_eq!(EggDevelopment::stage_index(1.5).unwrap(), 1);
        assert_eq!(EggDevelopment::stage_index(19.4).unwrap(), 18);
    }

    #[test]
    fn stage_index_out_of_table_is_an_error() {
        assert!(matches!(
            EggDevelopment::stage_index(0.4),
            Err(DomainError::StageIndexOutOfRange { index: -1, .. })
        ));
        assert!(matches!(
            EggDevelopment::stage_index(19.6),
            Err(DomainError::StageIndexOutOfRange { index: 19, .. })
        ));
        assert!(EggDevelopment::stage_index(f64::NAN).is_err());
    }

    #[test]
    fn out_of_range_advance_propagates() {
        let dev = EggDevelopment::default();
        assert!(dev.advance(1.0, 25.0, 3.0, &mut NoDraws).is_err());
    }
}
