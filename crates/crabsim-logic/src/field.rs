//! Hydrodynamic field provider interface and an analytic shelf-sea field.
//!
//! The ocean model itself lives outside this crate. Entities only see it
//! through [`HydroField`]: velocity and scalar interpolation, grid edge
//! checks, and coordinate conversion between geographic and grid space.
//!
//! Conventions: longitude/latitude in degrees, depth in metres positive
//! downward, `w` in m/s positive upward, grid `k` increasing toward the
//! surface (0 at the bottom, `layers` at the surface).

use serde::{Deserialize, Serialize};

/// Mean Earth radius (m).
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Geographic position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    /// Metres below the surface.
    pub depth: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64, depth: f64) -> Self {
        Self { lon, lat, depth }
    }
}

/// Fractional grid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

/// Horizontal grid cell an entity occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub i: i64,
    pub j: i64,
}

impl GridPoint {
    pub fn cell(&self) -> GridCell {
        GridCell {
            i: self.i.floor() as i64,
            j: self.j.floor() as i64,
        }
    }
}

/// Velocity sample (m/s), `w` positive upward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Velocity {
    pub fn new(u: f64, v: f64, w: f64) -> Self {
        Self { u, v, w }
    }

    pub fn mean(&self, other: &Velocity) -> Velocity {
        Velocity {
            u: 0.5 * (self.u + other.u),
            v: 0.5 * (self.v + other.v),
            w: 0.5 * (self.w + other.w),
        }
    }
}

impl std::ops::Add for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Velocity) -> Velocity {
        Velocity {
            u: self.u + rhs.u,
            v: self.v + rhs.v,
            w: self.w + rhs.w,
        }
    }
}

/// Read-only view of the ocean model.
pub trait HydroField {
    /// Advective velocity at `position` and `time` (seconds since epoch).
    fn velocity(&self, position: &Position, time: f64) -> Velocity;

    fn temperature(&self, position: &Position) -> f64;

    fn salinity(&self, position: &Position) -> f64;

    /// Water-column depth (m, positive) at the horizontal location of `position`.
    fn bathymetric_depth(&self, position: &Position) -> f64;

    /// Sea-surface height (m).
    fn ssh(&self, position: &Position) -> f64;

    /// Any other interpolated field by name; `None` if the model lacks it.
    fn field(&self, name: &str, position: &Position) -> Option<f64>;

    /// True within `tolerance` grid cells of the open edge of the domain.
    fn is_at_grid_edge(&self, position: &Position, tolerance: f64) -> bool;

    fn to_grid(&self, position: &Position) -> GridPoint;

    fn to_geographic(&self, grid: &GridPoint) -> Position;

    /// Fractional vertical grid index for `depth` at the horizontal location of `position`.
    fn k_from_z(&self, position: &Position, depth: f64) -> f64;

    /// Move `position` by `velocity` for `dt` seconds on a spherical Earth.
    fn displace(&self, position: &Position, velocity: &Velocity, dt: f64) -> Position {
        let lat_rad = position.lat.to_radians();
        let dlat = (velocity.v * dt / EARTH_RADIUS).to_degrees();
        let cos_lat = lat_rad.cos();
        let dlon = if cos_lat.abs() > 1e-9 {
            (velocity.u * dt / (EARTH_RADIUS * cos_lat)).to_degrees()
        } else {
            0.0
        };
        Position {
            lon: position.lon + dlon,
            lat: position.lat + dlat,
            depth: position.depth - velocity.w * dt,
        }
    }
}

/// Analytic shelf sea: constant current, bathymetry deepening eastward,
/// temperature decreasing linearly with depth down to a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformField {
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    /// Degrees per horizontal grid cell.
    pub resolution: f64,
    pub layers: u32,
    /// Bottom depth at `lon_min` (m).
    pub shelf_depth: f64,
    /// Bottom deepening per degree of longitude eastward (m).
    pub depth_slope: f64,
    pub surface_temperature: f64,
    /// Cooling with depth (°C per m).
    pub temperature_gradient: f64,
    pub min_temperature: f64,
    pub salinity: f64,
    pub ph: Option<f64>,
}

impl Default for UniformField {
    fn default() -> Self {
        Self {
            u: 0.0,
            v: 0.0,
            w: 0.0,
            lon_min: -170.0,
            lon_max: -160.0,
            lat_min: 55.0,
            lat_max: 62.0,
            resolution: 0.1,
            layers: 20,
            shelf_depth: 20.0,
            depth_slope: 15.0,
            surface_temperature: 8.0,
            temperature_gradient: 0.08,
            min_temperature: -1.0,
            salinity: 32.0,
            ph: None,
        }
    }
}

impl UniformField {
    /// Field with the given current and default geometry.
    pub fn with_current(u: f64, v: f64) -> Self {
        Self {
            u,
            v,
            ..Self::default()
        }
    }

    fn cells(&self) -> (f64, f64) {
        (
            (self.lon_max - self.lon_min) / self.resolution,
            (self.lat_max - self.lat_min) / self.resolution,
        )
    }
}

impl HydroField for UniformField {
    fn velocity(&self, _position: &Position, _time: f64) -> Velocity {
        Velocity::new(self.u, self.v, self.w)
    }

    fn temperature(&self, position: &Position) -> f64 {
        (self.surface_temperature - self.temperature_gradient * position.depth.max(0.0))
            .max(self.min_temperature)
    }

    fn salinity(&self, _position: &Position) -> f64 {
        self.salinity
    }

    fn bathymetric_depth(&self, position: &Position) -> f64 {
        (self.shelf_depth + self.depth_slope * (position.lon - self.lon_min)).max(1.0)
    }

    fn ssh(&self, _position: &Position) -> f64 {
        0.0
    }

    fn field(&self, name: &str, position: &Position) -> Option<f64> {
        match name {
            "temperature" => Some(self.temperature(position)),
            "salinity" => Some(self.salinity(position)),
            "bathymetry" => Some(self.bathymetric_depth(position)),
            "ssh" => Some(self.ssh(position)),
            "ph" => self.ph,
            _ => None,
        }
    }

    fn is_at_grid_edge(&self, position: &Position, tolerance: f64) -> bool {
        let grid = self.to_grid(position);
        let (ni, nj) = self.cells();
        grid.i < tolerance || grid.j < tolerance || grid.i > ni - tolerance || grid.j > nj - tolerance
    }

    fn to_grid(&self, position: &Position) -> GridPoint {
        GridPoint {
            i: (position.lon - self.lon_min) / self.resolution,
            j: (position.lat - self.lat_min) / self.resolution,
            k: self.k_from_z(position, position.depth),
        }
    }

    fn to_geographic(&self, grid: &GridPoint) -> Position {
        let mut position = Position {
            lon: self.lon_min + grid.i * self.resolution,
            lat: self.lat_min + grid.j * self.resolution,
            depth: 0.0,
        };
        let bottom = self.bathymetric_depth(&position);
        position.depth = bottom * (1.0 - grid.k / f64::from(self.layers));
        position
    }

    fn k_from_z(&self, position: &Position, depth: f64) -> f64 {
        let bottom = self.bathymetric_depth(position);
        let fraction = (depth / bottom).clamp(0.0, 1.0);
        f64::from(self.layers) * (1.0 - fraction)
    }
}
