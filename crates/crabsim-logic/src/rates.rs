//! Rate-function capability: the pluggable curves a stage is built from.
//!
//! Functions are grouped by [`FunctionCategory`]. Each category is a closed
//! enum of variants; a stage declares which variants its code path accepts
//! (see [`crate::stages::StageSchema`]) and binding rejects anything else, so
//! the stepper only ever matches on variants it knows.
//!
//! | Category | Output | Variants |
//! |----------|--------|----------|
//! | Mortality | rate (1/day) | constant, size power law, temperature exponential |
//! | Development | stage / molt indicator | none, egg temperature table, molt duration |
//! | Growth | size or weight | none, linear, exponential, logistic, temperature-linear, bioenergetic |
//! | VerticalMovement | w (m/s) | see [`crate::vertical`] |
//! | HorizontalMovement | (u, v) (m/s) | none, random walk, directed swimming |
//! | Fecundity | eggs per batch | constant, size power law |

use serde::{Deserialize, Serialize};

use crate::context::RandomSource;
use crate::egg_development::EggDevelopment;
use crate::error::DomainError;
use crate::vertical::VerticalMovement;

/// Functional role a rate function plays in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionCategory {
    Mortality,
    Development,
    Growth,
    VerticalMovement,
    HorizontalMovement,
    Fecundity,
}

impl FunctionCategory {
    pub fn all() -> &'static [FunctionCategory] {
        &[
            Self::Mortality,
            Self::Development,
            Self::Growth,
            Self::VerticalMovement,
            Self::HorizontalMovement,
            Self::Fecundity,
        ]
    }

    /// Inputs the stepper hands to functions of this category.
    pub fn provided_inputs(&self) -> &'static [RateInput] {
        use RateInput::*;
        match self {
            Self::Mortality | Self::Development | Self::Growth => {
                &[Temperature, Size, Weight, DevStage, Depth, BottomDepth]
            }
            Self::VerticalMovement => &[Depth, BottomDepth, Temperature, DayOfYear, Position],
            Self::HorizontalMovement => &[],
            Self::Fecundity => &[Size],
        }
    }
}

/// Tag identifying one rate-function variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    ConstantMortality,
    SizePowerLawMortality,
    TemperatureExponentialMortality,
    NoDevelopment,
    EggTemperature,
    MoltDuration,
    NoGrowth,
    LinearGrowth,
    ExponentialGrowth,
    LogisticGrowth,
    TemperatureLinearGrowth,
    Bioenergetic,
    Passive,
    Attached,
    FixedDepthRange,
    OffBottom,
    DepthTemperatureRange,
    DielMigration,
    NoHorizontalMovement,
    RandomWalk,
    DirectedSwimming,
    ConstantFecundity,
    SizePowerLawFecundity,
}

/// A state or environment value a rate function reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateInput {
    Temperature,
    Size,
    Weight,
    DevStage,
    Depth,
    BottomDepth,
    DayOfYear,
    Position,
}

/// Values handed to a rate function at a call site.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateInputs {
    pub temperature: f64,
    pub size: f64,
    pub weight: f64,
    pub dev_stage: f64,
    pub depth: f64,
    pub bottom_depth: f64,
}

// ============================================================================
// MORTALITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MortalityFunction {
    /// Fixed instantaneous rate per day.
    Constant { rate: f64 },
    /// `a * size^b`; `b` is normally negative.
    SizePowerLaw { a: f64, b: f64 },
    /// `base * exp(coefficient * (T - reference))`.
    TemperatureExponential {
        base: f64,
        coefficient: f64,
        reference: f64,
    },
}

impl MortalityFunction {
    /// Instantaneous mortality (1/day), never negative.
    pub fn rate(&self, inputs: &RateInputs) -> Result<f64, DomainError> {
        let mu = match *self {
            Self::Constant { rate } => rate,
            Self::SizePowerLaw { a, b } => {
                if inputs.size > 0.0 {
                    a * inputs.size.powf(b)
                } else {
                    a
                }
            }
            Self::TemperatureExponential {
                base,
                coefficient,
                reference,
            } => base * (coefficient * (inputs.temperature - reference)).exp(),
        };
        if !mu.is_finite() {
            return Err(DomainError::NonFiniteState {
                field: "mortality",
                value: mu,
            });
        }
        Ok(mu.max(0.0))
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Constant { .. } => FunctionKind::ConstantMortality,
            Self::SizePowerLaw { .. } => FunctionKind::SizePowerLawMortality,
            Self::TemperatureExponential { .. } => FunctionKind::TemperatureExponentialMortality,
        }
    }
}

// ============================================================================
// DEVELOPMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevelopmentFunction {
    None,
    /// Stage-table egg development, see [`crate::egg_development`].
    EggTemperature(EggDevelopment),
    /// Stage duration `a * exp(-b * T)` days; the molt indicator integrates `dt / duration`.
    MoltDuration { a: f64, b: f64 },
}

impl DevelopmentFunction {
    /// Stage duration in days at temperature `t` (molt-duration variant only).
    pub fn stage_duration(&self, t: f64) -> Option<f64> {
        match *self {
            Self::MoltDuration { a, b } => Some(a * (-b * t).exp()),
            _ => None,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::None => FunctionKind::NoDevelopment,
            Self::EggTemperature(_) => FunctionKind::EggTemperature,
            Self::MoltDuration { .. } => FunctionKind::MoltDuration,
        }
    }
}

// ============================================================================
// GROWTH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GrowthFunction {
    None,
    /// Size increases by `rate` per day.
    Linear { rate: f64 },
    /// Size grows as `exp(rate * t)`.
    Exponential { rate: f64 },
    /// Logistic approach to `asymptote`.
    Logistic { rate: f64, asymptote: f64 },
    /// Size increases by `intercept + slope * T` per day.
    TemperatureLinear { intercept: f64, slope: f64 },
    /// Specific weight change `consumption - respiration_base * exp(respiration_coefficient * T)` per day.
    Bioenergetic {
        consumption: f64,
        respiration_base: f64,
        respiration_coefficient: f64,
    },
}

/// Result of integrating a growth function over one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthOutcome {
    pub size: f64,
    pub weight: f64,
    /// Net specific weight change (1/day); negative means the entity is starving.
    pub net_balance: f64,
}

impl GrowthFunction {
    /// Integrate size/weight over `dt_days` (exact where the curve allows it).
    ///
    /// `length_weight = (a, b)` converts size to weight as `a * size^b` for the
    /// size-based variants; the bioenergetic variant integrates weight directly
    /// and only lets size grow.
    pub fn advance(&self, inputs: &RateInputs, dt_days: f64, length_weight: (f64, f64)) -> GrowthOutcome {
        let (lw_a, lw_b) = length_weight;
        let weight_of = |size: f64| {
            if size > 0.0 {
                lw_a * size.powf(lw_b)
            } else {
                0.0
            }
        };
        let size_only = |size: f64| GrowthOutcome {
            size,
            weight: weight_of(size),
            net_balance: 0.0,
        };
        match *self {
            Self::None => GrowthOutcome {
                size: inputs.size,
                weight: inputs.weight,
                net_balance: 0.0,
            },
            Self::Linear { rate } => size_only((inputs.size + rate * dt_days).max(0.0)),
            Self::Exponential { rate } => size_only(inputs.size * (rate * dt_days).exp()),
            Self::Logistic { rate, asymptote } => {
                if inputs.size <= 0.0 || asymptote <= 0.0 {
                    return size_only(inputs.size);
                }
                let ratio = asymptote / inputs.size - 1.0;
                size_only(asymptote / (1.0 + ratio * (-rate * dt_days).exp()))
            }
            Self::TemperatureLinear { intercept, slope } => {
                let rate = intercept + slope * inputs.temperature;
                size_only((inputs.size + rate * dt_days).max(0.0))
            }
            Self::Bioenergetic {
                consumption,
                respiration_base,
                respiration_coefficient,
            } => {
                let net = consumption
                    - respiration_base * (respiration_coefficient * inputs.temperature).exp();
                let weight = inputs.weight * (net * dt_days).exp();
                let implied_size = if lw_a > 0.0 && lw_b != 0.0 && weight > 0.0 {
                    (weight / lw_a).powf(1.0 / lw_b)
                } else {
                    inputs.size
                };
                GrowthOutcome {
                    size: inputs.size.max(implied_size),
                    weight,
                    net_balance: net,
                }
            }
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::None => FunctionKind::NoGrowth,
            Self::Linear { .. } => FunctionKind::LinearGrowth,
            Self::Exponential { .. } => FunctionKind::ExponentialGrowth,
            Self::Logistic { .. } => FunctionKind::LogisticGrowth,
            Self::TemperatureLinear { .. } => FunctionKind::TemperatureLinearGrowth,
            Self::Bioenergetic { .. } => FunctionKind::Bioenergetic,
        }
    }
}

// ============================================================================
// HORIZONTAL MOVEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HorizontalMovement {
    None,
    /// Diffusive random walk with horizontal diffusivity `diffusivity` (m²/s).
    RandomWalk { diffusivity: f64 },
    /// Constant swimming at `speed` (m/s) toward `heading` (degrees clockwise from north).
    DirectedSwimming { speed: f64, heading: f64 },
}

impl HorizontalMovement {
    /// Velocity (u, v) in m/s added to the advective flow for a step of `dt` seconds.
    ///
    /// The random-walk term is `r * N(0,1)` per axis with `r = sqrt(D / |dt|)`;
    /// both terms are scaled by `sign(dt)` so backward integration is valid.
    pub fn velocity(&self, dt: f64, rng: &mut dyn RandomSource) -> (f64, f64) {
        let sign = if dt < 0.0 { -1.0 } else { 1.0 };
        match *self {
            Self::None => (0.0, 0.0),
            Self::RandomWalk { diffusivity } => {
                if diffusivity <= 0.0 || dt == 0.0 {
                    return (0.0, 0.0);
                }
                let r = (diffusivity / dt.abs()).sqrt();
                (sign * r * rng.normal(), sign * r * rng.normal())
            }
            Self::DirectedSwimming { speed, heading } => {
                let theta = heading.to_radians();
                (sign * speed * theta.sin(), sign * speed * theta.cos())
            }
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::None => FunctionKind::NoHorizontalMovement,
            Self::RandomWalk { .. } => FunctionKind::RandomWalk,
            Self::DirectedSwimming { .. } => FunctionKind::DirectedSwimming,
        }
    }
}

// ============================================================================
// FECUNDITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FecundityFunction {
    Constant { eggs: f64 },
    /// `a * size^b` eggs per batch.
    SizePowerLaw { a: f64, b: f64 },
}

impl FecundityFunction {
    /// Number of offspring in one batch (rounded, never negative).
    pub fn batch_size(&self, size: f64) -> u64 {
        let eggs = match *self {
            Self::Constant { eggs } => eggs,
            Self::SizePowerLaw { a, b } => {
                if size > 0.0 {
                    a * size.powf(b)
                } else {
                    0.0
                }
            }
        };
        if eggs.is_finite() && eggs > 0.0 {
            eggs.round() as u64
        } else {
            0
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Constant { .. } => FunctionKind::ConstantFecundity,
            Self::SizePowerLaw { .. } => FunctionKind::SizePowerLawFecundity,
        }
    }
}

// ============================================================================
// RATE FUNCTION (catalog entry)
// ============================================================================

/// One catalog entry: any rate function, tagged by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateFunction {
    Mortality(MortalityFunction),
    Development(DevelopmentFunction),
    Growth(GrowthFunction),
    VerticalMovement(VerticalMovement),
    HorizontalMovement(HorizontalMovement),
    Fecundity(FecundityFunction),
}

impl RateFunction {
    pub fn category(&self) -> FunctionCategory {
        match self {
            Self::Mortality(_) => FunctionCategory::Mortality,
            Self::Development(_) => FunctionCategory::Development,
            Self::Growth(_) => FunctionCategory::Growth,
            Self::VerticalMovement(_) => FunctionCategory::VerticalMovement,
            Self::HorizontalMovement(_) => FunctionCategory::HorizontalMovement,
            Self::Fecundity(_) => FunctionCategory::Fecundity,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Mortality(f) => f.kind(),
            Self::Development(f) => f.kind(),
            Self::Growth(f) => f.kind(),
            Self::VerticalMovement(f) => f.kind(),
            Self::HorizontalMovement(f) => f.kind(),
            Self::Fecundity(f) => f.kind(),
        }
    }

    /// Catalog name used for selection in configuration files.
    pub fn name(&self) -> &'static str {
        match self.kind() {
            FunctionKind::ConstantMortality => "constant",
            FunctionKind::SizePowerLawMortality => "size power law",
            FunctionKind::TemperatureExponentialMortality => "temperature exponential",
            FunctionKind::NoDevelopment => "none",
            FunctionKind::EggTemperature => "egg temperature",
            FunctionKind::MoltDuration => "molt duration",
            FunctionKind::NoGrowth => "none",
            FunctionKind::LinearGrowth => "linear",
            FunctionKind::ExponentialGrowth => "exponential",
            FunctionKind::LogisticGrowth => "logistic",
            FunctionKind::TemperatureLinearGrowth => "temperature linear",
            FunctionKind::Bioenergetic => "bioenergetic",
            FunctionKind::Passive => "passive",
            FunctionKind::Attached => "attached",
            FunctionKind::FixedDepthRange => "fixed depth range",
            FunctionKind::OffBottom => "off bottom",
            FunctionKind::DepthTemperatureRange => "depth and temperature range",
            FunctionKind::DielMigration => "diel vertical migration",
            FunctionKind::NoHorizontalMovement => "none",
            FunctionKind::RandomWalk => "random walk",
            FunctionKind::DirectedSwimming => "directed swimming",
            FunctionKind::ConstantFecundity => "constant",
            FunctionKind::SizePowerLawFecundity => "size power law",
        }
    }

    /// Whether every input this function reads is available where `category` is called.
    pub fn fits_call_site(&self, category: FunctionCategory) -> bool {
        self.inputs()
            .iter()
            .all(|input| category.provided_inputs().contains(input))
    }

    /// Inputs this function reads at its call site.
    pub fn inputs(&self) -> &'static [RateInput] {
        use RateInput::*;
        match self.kind() {
            FunctionKind::ConstantMortality
            | FunctionKind::NoDevelopment
            | FunctionKind::NoGrowth
            | FunctionKind::Passive
            | FunctionKind::NoHorizontalMovement
            | FunctionKind::RandomWalk
            | FunctionKind::DirectedSwimming
            | FunctionKind::ConstantFecundity => &[],
            FunctionKind::SizePowerLawMortality | FunctionKind::SizePowerLawFecundity => &[Size],
            FunctionKind::TemperatureExponentialMortality
            | FunctionKind::MoltDuration
            | FunctionKind::TemperatureLinearGrowth => &[Temperature],
            FunctionKind::EggTemperature => &[DevStage, Temperature],
            FunctionKind::LinearGrowth
            | FunctionKind::ExponentialGrowth
            | FunctionKind::LogisticGrowth => &[Size],
            FunctionKind::Bioenergetic => &[Weight, Temperature],
            FunctionKind::Attached => &[BottomDepth],
            FunctionKind::FixedDepthRange => &[Depth],
            FunctionKind::OffBottom => &[Depth, BottomDepth],
            FunctionKind::DepthTemperatureRange => &[Depth, Temperature],
            FunctionKind::DielMigration => &[Depth, DayOfYear, Position],
        }
    }

    /// Named scalar parameters, in declaration order.
    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::Mortality(f) => match *f {
                MortalityFunction::Constant { rate } => vec![("rate", rate)],
                MortalityFunction::SizePowerLaw { a, b } => vec![("a", a), ("b", b)],
                MortalityFunction::TemperatureExponential {
                    base,
                    coefficient,
                    reference,
                } => vec![
                    ("base", base),
                    ("coefficient", coefficient),
                    ("reference", reference),
                ],
            },
            Self::Development(f) => match f {
                DevelopmentFunction::None => vec![],
                DevelopmentFunction::EggTemperature(e) => vec![
                    ("t_coeff", e.t_coeff),
                    ("sigma", e.sigma),
                    ("use_in_situ", if e.use_in_situ { 1.0 } else { 0.0 }),
                    ("nominal_temperature", e.nominal_temperature),
                ],
                DevelopmentFunction::MoltDuration { a, b } => vec![("a", *a), ("b", *b)],
            },
            Self::Growth(f) => match *f {
                GrowthFunction::None => vec![],
                GrowthFunction::Linear { rate } | GrowthFunction::Exponential { rate } => {
                    vec![("rate", rate)]
                }
                GrowthFunction::Logistic { rate, asymptote } => {
                    vec![("rate", rate), ("asymptote", asymptote)]
                }
                GrowthFunction::TemperatureLinear { intercept, slope } => {
                    vec![("intercept", intercept), ("slope", slope)]
                }
                GrowthFunction::Bioenergetic {
                    consumption,
                    respiration_base,
                    respiration_coefficient,
                } => vec![
                    ("consumption", consumption),
                    ("respiration_base", respiration_base),
                    ("respiration_coefficient", respiration_coefficient),
                ],
            },
            Self::VerticalMovement(f) => f.parameters(),
            Self::HorizontalMovement(f) => match *f {
                HorizontalMovement::None => vec![],
                HorizontalMovement::RandomWalk { diffusivity } => {
                    vec![("diffusivity", diffusivity)]
                }
                HorizontalMovement::DirectedSwimming { speed, heading } => {
                    vec![("speed", speed), ("heading", heading)]
                }
            },
            Self::Fecundity(f) => match *f {
                FecundityFunction::Constant { eggs } => vec![("eggs", eggs)],
                FecundityFunction::SizePowerLaw { a, b } => vec![("a", a), ("b", b)],
            },
        }
    }

    /// Set a named scalar parameter. Returns false if the function has no such parameter.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> bool {
        let slot: Option<&mut f64> = match self {
            Self::Mortality(f) => match (f, name) {
                (MortalityFunction::Constant { rate }, "rate") => Some(rate),
                (MortalityFunction::SizePowerLaw { a, .. }, "a") => Some(a),
                (MortalityFunction::SizePowerLaw { b, .. }, "b") => Some(b),
                (MortalityFunction::TemperatureExponential { base, .. }, "base") => Some(base),
                (MortalityFunction::TemperatureExponential { coefficient, .. }, "coefficient") => {
                    Some(coefficient)
                }
                (MortalityFunction::TemperatureExponential { reference, .. }, "reference") => {
                    Some(reference)
                }
                _ => None,
            },
            Self::Development(f) => match (f, name) {
                (DevelopmentFunction::EggTemperature(e), "use_in_situ") => {
                    e.use_in_situ = value != 0.0;
                    return true;
                }
                (DevelopmentFunction::EggTemperature(e), "t_coeff") => Some(&mut e.t_coeff),
                (DevelopmentFunction::EggTemperature(e), "sigma") => Some(&mut e.sigma),
                (DevelopmentFunction::EggTemperature(e), "nominal_temperature") => {
                    Some(&mut e.nominal_temperature)
                }
                (DevelopmentFunction::MoltDuration { a, .. }, "a") => Some(a),
                (DevelopmentFunction::MoltDuration { b, .. }, "b") => Some(b),
                _ => None,
            },
            Self::Growth(f) => match (f, name) {
                (GrowthFunction::Linear { rate }, "rate")
                | (GrowthFunction::Exponential { rate }, "rate")
                | (GrowthFunction::Logistic { rate, .. }, "rate") => Some(rate),
                (GrowthFunction::Logistic { asymptote, .. }, "asymptote") => Some(asymptote),
                (GrowthFunction::TemperatureLinear { intercept, .. }, "intercept") => {
                    Some(intercept)
                }
                (GrowthFunction::TemperatureLinear { slope, .. }, "slope") => Some(slope),
                (GrowthFunction::Bioenergetic { consumption, .. }, "consumption") => {
                    Some(consumption)
                }
                (GrowthFunction::Bioenergetic { respiration_base, .. }, "respiration_base") => {
                    Some(respiration_base)
                }
                (
                    GrowthFunction::Bioenergetic {
                        respiration_coefficient,
                        ..
                    },
                    "respiration_coefficient",
                ) => Some(respiration_coefficient),
                _ => None,
            },
            Self::VerticalMovement(f) => return f.set_parameter(name, value),
            Self::HorizontalMovement(f) => match (f, name) {
                (HorizontalMovement::RandomWalk { diffusivity }, "diffusivity") => {
                    Some(diffusivity)
                }
                (HorizontalMovement::DirectedSwimming { speed, .. }, "speed") => Some(speed),
                (HorizontalMovement::DirectedSwimming { heading, .. }, "heading") => Some(heading),
                _ => None,
            },
            Self::Fecundity(f) => match (f, name) {
                (FecundityFunction::Constant { eggs }, "eggs") => Some(eggs),
                (FecundityFunction::SizePowerLaw { a, .. }, "a") => Some(a),
                (FecundityFunction::SizePowerLaw { b, .. }, "b") => Some(b),
                _ => None,
            },
        };
        match slot {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SeededRandom;

    fn inputs(size: f64, temperature: f64) -> RateInputs {
        RateInputs {
            size,
            temperature,
            ..RateInputs::default()
        }
    }

    #[test]
    fn mortality_variants() {
        let c = MortalityFunction::Constant { rate: 0.1 };
        assert_eq!(c.rate(&inputs(5.0, 2.0)).unwrap(), 0.1);

        let p = MortalityFunction::SizePowerLaw { a: 0.2, b: -1.0 };
        assert!((p.rate(&inputs(4.0, 0.0)).unwrap() - 0.05).abs() < 1e-12);

        let t = MortalityFunction::TemperatureExponential {
            base: 0.1,
            coefficient: 0.1,
            reference: 2.0,
        };
        assert!((t.rate(&inputs(0.0, 2.0)).unwrap() - 0.1).abs() < 1e-12);
        assert!(t.rate(&inputs(0.0, 5.0)).unwrap() > 0.1);
    }

    #[test]
    fn mortality_never_negative() {
        let c = MortalityFunction::Constant { rate: -1.0 };
        assert_eq!(c.rate(&RateInputs::default()).unwrap(), 0.0);
    }

    #[test]
    fn non_finite_mortality_is_a_domain_error() {
        let t = MortalityFunction::TemperatureExponential {
            base: 0.1,
            coefficient: 1000.0,
            reference: 0.0,
        };
        assert!(matches!(
            t.rate(&inputs(0.0, 10.0)),
            Err(DomainError::NonFiniteState { field: "mortality", .. })
        ));

        let t = MortalityFunction::TemperatureExponential {
            base: 0.1,
            coefficient: 0.1,
            reference: 0.0,
        };
        assert!(t.rate(&inputs(0.0, f64::NAN)).is_err());
    }

    #[test]
    fn logistic_growth_approaches_asymptote() {
        let g = GrowthFunction::Logistic {
            rate: 0.5,
            asymptote: 10.0,
        };
        let out = g.advance(&inputs(1.0, 0.0), 100.0, (1.0, 3.0));
        assert!((out.size - 10.0).abs() < 1e-6);
        assert!((out.weight - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn logistic_growth_is_step_size_invariant() {
        let g = GrowthFunction::Logistic {
            rate: 0.3,
            asymptote: 20.0,
        };
        let one = g.advance(&inputs(2.0, 0.0), 4.0, (1.0, 3.0)).size;
        let mut s = 2.0;
        for _ in 0..4 {
            s = g.advance(&inputs(s, 0.0), 1.0, (1.0, 3.0)).size;
        }
        assert!((one - s).abs() < 1e-10);
    }

    #[test]
    fn bioenergetic_reports_starvation() {
        let g = GrowthFunction::Bioenergetic {
            consumption: 0.01,
            respiration_base: 0.02,
            respiration_coefficient: 0.0,
        };
        let start = RateInputs {
            size: 10.0,
            weight: 5.0,
            ..RateInputs::default()
        };
        let out = g.advance(&start, 1.0, (0.005, 3.0));
        assert!(out.net_balance < 0.0);
        assert!(out.weight < 5.0);
        // carapace does not shrink
        assert_eq!(out.size, 10.0);
    }

    #[test]
    fn random_walk_scales_with_sign_of_dt() {
        let walk = HorizontalMovement::RandomWalk { diffusivity: 2.0 };
        let mut a = SeededRandom::new(5);
        let mut b = SeededRandom::new(5);
        let (uf, vf) = walk.velocity(100.0, &mut a);
        let (ub, vb) = walk.velocity(-100.0, &mut b);
        assert!((uf + ub).abs() < 1e-12);
        assert!((vf + vb).abs() < 1e-12);
    }

    #[test]
    fn random_walk_without_diffusivity_is_still() {
        let walk = HorizontalMovement::RandomWalk { diffusivity: 0.0 };
        let mut rng = SeededRandom::new(1);
        assert_eq!(walk.velocity(60.0, &mut rng), (0.0, 0.0));
    }

    #[test]
    fn directed_swimming_heads_east() {
        let swim = HorizontalMovement::DirectedSwimming {
            speed: 0.1,
            heading: 90.0,
        };
        let mut rng = SeededRandom::new(1);
        let (u, v) = swim.velocity(60.0, &mut rng);
        assert!((u - 0.1).abs() < 1e-12);
        assert!(v.abs() < 1e-12);
    }

    #[test]
    fn fecundity_rounds() {
        assert_eq!(FecundityFunction::Constant { eggs: 2.6 }.batch_size(0.0), 3);
        let p = FecundityFunction::SizePowerLaw { a: 0.5, b: 2.0 };
        assert_eq!(p.batch_size(4.0), 8);
        assert_eq!(p.batch_size(0.0), 0);
    }

    #[test]
    fn parameters_round_trip_through_setter() {
        let mut f = RateFunction::Mortality(MortalityFunction::TemperatureExponential {
            base: 0.1,
            coefficient: 0.2,
            reference: 0.0,
        });
        assert!(f.set_parameter("coefficient", 0.3));
        assert!(!f.set_parameter("rate", 1.0));
        assert_eq!(
            f.parameters(),
            vec![("base", 0.1), ("coefficient", 0.3), ("reference", 0.0)]
        );
    }

    #[test]
    fn egg_flag_parameter() {
        let mut f = RateFunction::Development(DevelopmentFunction::EggTemperature(
            EggDevelopment::default(),
        ));
        assert!(f.set_parameter("use_in_situ", 1.0));
        match f {
            RateFunction::Development(DevelopmentFunction::EggTemperature(e)) => {
                assert!(e.use_in_situ)
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn call_sites_provide_what_functions_read() {
        let diel = RateFunction::VerticalMovement(VerticalMovement::DielMigration {
            night_min_depth: 0.0,
            night_max_depth: 15.0,
            day_min_depth: 20.0,
            day_max_depth: 60.0,
            speed: 0.004,
        });
        assert!(diel.fits_call_site(FunctionCategory::VerticalMovement));
        assert!(!diel.fits_call_site(FunctionCategory::Mortality));

        let exp = RateFunction::Mortality(MortalityFunction::TemperatureExponential {
            base: 0.1,
            coefficient: 0.1,
            reference: 0.0,
        });
        assert!(exp.fits_call_site(FunctionCategory::Mortality));
        assert!(!exp.fits_call_site(FunctionCategory::Fecundity));
        assert!(!exp.fits_call_site(FunctionCategory::HorizontalMovement));
    }

    #[test]
    fn categories_and_names() {
        let f = RateFunction::Growth(GrowthFunction::Linear { rate: 1.0 });
        assert_eq!(f.category(), FunctionCategory::Growth);
        assert_eq!(f.kind(), FunctionKind::LinearGrowth);
        assert_eq!(f.name(), "linear");
        assert_eq!(f.inputs(), &[RateInput::Size]);
    }
}
