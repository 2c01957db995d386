//! Predictor-corrector particle tracking through a [`HydroField`].
//!
//! 1. Sample the flow and the vertical behaviour at the current position
//!    (`current`) and take a predictor step with it.
//! 2. Re-sample at the predicted position (`next`). The flow is always
//!    re-sampled; the vertical behaviour only if it reads position-dependent
//!    conditions. The corrector step from the start position uses the mean
//!    of both samples.
//!
//! Swimming velocity from horizontal movement is drawn once per step and
//! added to both samples.

use crate::field::{HydroField, Position, Velocity};
use crate::vertical::{VerticalContext, VerticalMovement};

/// Result of tracking one entity over one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStep {
    pub position: Position,
    /// The behaviour pinned the entity to the bottom; no advection happened.
    pub attached: bool,
    pub current: Velocity,
    pub next: Velocity,
}

/// Inputs to one tracking step.
#[derive(Debug, Clone, Copy)]
pub struct TrackRequest<'a> {
    pub position: Position,
    /// Seconds since the calendar epoch at the start of the step.
    pub time: f64,
    pub dt: f64,
    /// Day of year at `time`.
    pub day_of_year: f64,
    pub vertical: &'a VerticalMovement,
    /// Horizontal swimming velocity (u, v) for this step.
    pub swim: (f64, f64),
}

fn vertical_context(field: &dyn HydroField, position: &Position, day_of_year: f64) -> VerticalContext {
    VerticalContext {
        depth: position.depth,
        bottom_depth: field.bathymetric_depth(position),
        temperature: field.temperature(position),
        lon: position.lon,
        lat: position.lat,
        day_of_year,
    }
}

/// Advance `request.position` by one step.
pub fn track(field: &dyn HydroField, request: &TrackRequest<'_>) -> TrackStep {
    let TrackRequest {
        position,
        time,
        dt,
        day_of_year,
        vertical,
        swim,
    } = *request;
    let swimming = Velocity::new(swim.0, swim.1, 0.0);

    let decision = vertical.decide(&vertical_context(field, &position, day_of_year), dt);
    if decision.attached {
        let pinned = Position {
            depth: field.bathymetric_depth(&position),
            ..position
        };
        return TrackStep {
            position: pinned,
            attached: true,
            current: Velocity::default(),
            next: Velocity::default(),
        };
    }

    let current = field.velocity(&position, time)
        + swimming
        + Velocity::new(0.0, 0.0, decision.w);
    let predicted = field.displace(&position, &current, dt);

    let w_next = if vertical.depends_on_position() {
        let later = day_of_year + dt / crate::context::SECONDS_PER_DAY;
        vertical
            .decide(&vertical_context(field, &predicted, later), dt)
            .w
    } else {
        decision.w
    };
    let next = field.velocity(&predicted, time + dt) + swimming + Velocity::new(0.0, 0.0, w_next);

    let mut corrected = field.displace(&position, &current.mean(&next), dt);
    let bottom = field.bathymetric_depth(&corrected);
    corrected.depth = corrected.depth.clamp(0.0, bottom.max(0.0));

    TrackStep {
        position: corrected,
        attached: false,
        current,
        next,
    }
}
