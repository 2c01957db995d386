//! Vertical movement behaviours and the day/night test they depend on.
//!
//! Depth is positive downward (m). Vertical velocity `w` follows the ocean
//! model convention: positive upward (m/s), so swimming deeper means `w < 0`.
//! Every behaviour swims toward a target depth at most at its configured speed
//! and never overshoots the target within one step.

use serde::{Deserialize, Serialize};

use crate::rates::FunctionKind;

/// Solar zenith angle (degrees) separating day from night, civil-twilight corrected.
pub const TWILIGHT_ZENITH: f64 = 90.833;

/// Vertical movement rule selected for a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerticalMovement {
    /// Drifts with the vertical flow only.
    Passive,
    /// Held on the substrate: pinned to the bottom, no advection.
    Attached,
    /// Stays within `[min_depth, max_depth]`.
    FixedDepthRange {
        min_depth: f64,
        max_depth: f64,
        speed: f64,
    },
    /// Holds `distance` metres above the bottom.
    OffBottom { distance: f64, speed: f64 },
    /// Stays within a depth range and seeks the temperature range inside it.
    DepthTemperatureRange {
        min_depth: f64,
        max_depth: f64,
        min_temperature: f64,
        max_temperature: f64,
        speed: f64,
    },
    /// Diel vertical migration between a day and a night depth range.
    DielMigration {
        day_min_depth: f64,
        day_max_depth: f64,
        night_min_depth: f64,
        night_max_depth: f64,
        speed: f64,
    },
}

/// Local conditions a behaviour reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalContext {
    pub depth: f64,
    pub bottom_depth: f64,
    pub temperature: f64,
    pub lon: f64,
    pub lat: f64,
    /// Fractional, 1-based UTC day of year.
    pub day_of_year: f64,
}

/// Outcome of a behaviour for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalDecision {
    /// Swimming velocity, positive upward (m/s).
    pub w: f64,
    /// Entity is held on the substrate this step.
    pub attached: bool,
}

impl VerticalDecision {
    fn swim(w: f64) -> Self {
        Self { w, attached: false }
    }
}

impl VerticalMovement {
    /// Swimming velocity for a step of `dt` seconds.
    pub fn decide(&self, ctx: &VerticalContext, dt: f64) -> VerticalDecision {
        let floor = ctx.bottom_depth.max(0.0);
        match *self {
            Self::Passive => VerticalDecision::swim(0.0),
            Self::Attached => VerticalDecision { w: 0.0, attached: true },
            Self::FixedDepthRange {
                min_depth,
                max_depth,
                speed,
            } => {
                let target = clamp_to_range(ctx.depth, min_depth, max_depth.min(floor));
                VerticalDecision::swim(seek(ctx.depth, target, speed, dt))
            }
            Self::OffBottom { distance, speed } => {
                let target = (floor - distance).max(0.0);
                VerticalDecision::swim(seek(ctx.depth, target, speed, dt))
            }
            Self::DepthTemperatureRange {
                min_depth,
                max_depth,
                min_temperature,
                max_temperature,
                speed,
            } => {
                let deepest = max_depth.min(floor);
                let in_range = clamp_to_range(ctx.depth, min_depth, deepest);
                let target = if (in_range - ctx.depth).abs() > f64::EPSILON {
                    in_range
                } else if ctx.temperature < min_temperature {
                    // colder than preferred: head for the warmer surface layer
                    min_depth
                } else if ctx.temperature > max_temperature {
                    deepest
                } else {
                    ctx.depth
                };
                VerticalDecision::swim(seek(ctx.depth, target, speed, dt))
            }
            Self::DielMigration {
                day_min_depth,
                day_max_depth,
                night_min_depth,
                night_max_depth,
                speed,
            } => {
                let (lo, hi) = if is_daytime(ctx.lon, ctx.lat, ctx.day_of_year) {
                    (day_min_depth, day_max_depth)
                } else {
                    (night_min_depth, night_max_depth)
                };
                let target = clamp_to_range(ctx.depth, lo, hi.min(floor));
                VerticalDecision::swim(seek(ctx.depth, target, speed, dt))
            }
        }
    }

    /// Whether the rule holds the entity on the bottom, where it neither drifts nor swims.
    pub fn pins_to_bottom(&self) -> bool {
        matches!(self, Self::Attached)
    }

    /// Whether the rule needs the vertical velocity re-sampled at the predicted position.
    pub fn depends_on_position(&self) -> bool {
        !matches!(self, Self::Passive | Self::Attached)
    }

    pub fn kind(&self) -> FunctionKind {
        match self {
            Self::Passive => FunctionKind::Passive,
            Self::Attached => FunctionKind::Attached,
            Self::FixedDepthRange { .. } => FunctionKind::FixedDepthRange,
            Self::OffBottom { .. } => FunctionKind::OffBottom,
            Self::DepthTemperatureRange { .. } => FunctionKind::DepthTemperatureRange,
            Self::DielMigration { .. } => FunctionKind::DielMigration,
        }
    }

    pub fn parameters(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Self::Passive | Self::Attached => vec![],
            Self::FixedDepthRange {
                min_depth,
                max_depth,
                speed,
            } => vec![
                ("min_depth", min_depth),
                ("max_depth", max_depth),
                ("speed", speed),
            ],
            Self::OffBottom { distance, speed } => vec![("distance", distance), ("speed", speed)],
            Self::DepthTemperatureRange {
                min_depth,
                max_depth,
                min_temperature,
                max_temperature,
                speed,
            } => vec![
                ("min_depth", min_depth),
                ("max_depth", max_depth),
                ("min_temperature", min_temperature),
                ("max_temperature", max_temperature),
                ("speed", speed),
            ],
            Self::DielMigration {
                day_min_depth,
                day_max_depth,
                night_min_depth,
                night_max_depth,
                speed,
            } => vec![
                ("day_min_depth", day_min_depth),
                ("day_max_depth", day_max_depth),
                ("night_min_depth", night_min_depth),
                ("night_max_depth", night_max_depth),
                ("speed", speed),
            ],
        }
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> bool {
        let slot = match (self, name) {
            (Self::FixedDepthRange { min_depth, .. }, "min_depth")
            | (Self::DepthTemperatureRange { min_depth, .. }, "min_depth") => min_depth,
            (Self::FixedDepthRange { max_depth, .. }, "max_depth")
            | (Self::DepthTemperatureRange { max_depth, .. }, "max_depth") => max_depth,
            (Self::FixedDepthRange { speed, .. }, "speed")
            | (Self::OffBottom { speed, .. }, "speed")
            | (Self::DepthTemperatureRange { speed, .. }, "speed")
            | (Self::DielMigration { speed, .. }, "speed") => speed,
            (Self::OffBottom { distance, .. }, "distance") => distance,
            (Self::DepthTemperatureRange { min_temperature, .. }, "min_temperature") => {
                min_temperature
            }
            (Self::DepthTemperatureRange { max_temperature, .. }, "max_temperature") => {
                max_temperature
            }
            (Self::DielMigration { day_min_depth, .. }, "day_min_depth") => day_min_depth,
            (Self::DielMigration { day_max_depth, .. }, "day_max_depth") => day_max_depth,
            (Self::DielMigration { night_min_depth, .. }, "night_min_depth") => night_min_depth,
            (Self::DielMigration { night_max_depth, .. }, "night_max_depth") => night_max_depth,
            _ => return false,
        };
        *slot = value;
        true
    }
}

fn clamp_to_range(depth: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        return hi.max(0.0);
    }
    depth.clamp(lo, hi)
}

/// Upward velocity that moves `depth` toward `target` without overshooting.
fn seek(depth: f64, target: f64, speed: f64, dt: f64) -> f64 {
    let deepen = target - depth;
    if deepen == 0.0 || speed <= 0.0 || dt == 0.0 {
        return 0.0;
    }
    let magnitude = speed.min(deepen.abs() / dt.abs());
    // depth changes by -w * dt; the sign of dt keeps the target reachable when running backward
    -deepen.signum() * magnitude * dt.signum()
}

// ============================================================================
// SOLAR POSITION
// ============================================================================

/// Solar zenith angle in degrees (NOAA low-precision formulae).
///
/// `lon` is degrees east, `lat` degrees north, `day_of_year` the fractional
/// 1-based UTC day of year.
pub fn solar_zenith(lon: f64, lat: f64, day_of_year: f64) -> f64 {
    let hour = (day_of_year - day_of_year.floor()) * 24.0;
    let gamma = std::f64::consts::TAU / 365.0 * (day_of_year.floor() - 1.0 + (hour - 12.0) / 24.0);

    let eq_time = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());
    let decl = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let true_solar_minutes = hour * 60.0 + eq_time + 4.0 * lon;
    let hour_angle = (true_solar_minutes / 4.0 - 180.0).to_radians();
    let phi = lat.to_radians();

    let cos_zenith = phi.sin() * decl.sin() + phi.cos() * decl.cos() * hour_angle.cos();
    cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Whether the sun is above the twilight threshold.
pub fn is_daytime(lon: f64, lat: f64, day_of_year: f64) -> bool {
    solar_zenith(lon, lat, day_of_year) < TWILIGHT_ZENITH
}
