//! Flat, ordered snapshot of an entity for reporting.
//!
//! The header and the values come from the same field table, so they always
//! line up: common fields first, then the stage schema's attributes.

use serde::{Deserialize, Serialize};

use crate::entity::CohortEntity;
use crate::stages::{Attribute, StageType};

/// A single reported value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Bool(bool),
    Int(u64),
    Float(f64),
    Text(String),
    Missing,
}

impl std::fmt::Display for ReportValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Missing => f.write_str("NA"),
        }
    }
}

/// Fields every entity reports, in order.
pub const COMMON_FIELDS: &[&str] = &[
    "id",
    "parent_id",
    "orig_id",
    "stage",
    "alive",
    "active",
    "super_individual",
    "number",
    "num_trans",
    "age",
    "age_in_stage",
    "lon",
    "lat",
    "depth",
    "grid_i",
    "grid_j",
    "grid_k",
    "track_len",
    "temperature",
    "salinity",
    "bottom_depth",
    "ph",
];

/// Report header for entities of `stage`.
pub fn report_header(stage: StageType) -> Vec<&'static str> {
    COMMON_FIELDS
        .iter()
        .copied()
        .chain(stage.schema().attributes.iter().map(Attribute::name))
        .collect()
}

impl CohortEntity {
    pub fn report_header(&self) -> Vec<&'static str> {
        report_header(self.stage)
    }

    /// Values matching [`CohortEntity::report_header`] position by position.
    pub fn report_values(&self) -> Vec<ReportValue> {
        use ReportValue::{Bool, Float, Int};

        let mut values = vec![
            Int(self.id),
            Int(self.parent_id),
            Int(self.orig_id),
            ReportValue::Text(self.stage.name().to_string()),
            Bool(self.is_alive()),
            Bool(self.is_active()),
            Bool(self.super_individual),
            Float(self.number),
            Float(self.num_trans),
            Float(self.age),
            Float(self.age_in_stage),
            Float(self.position.lon),
            Float(self.position.lat),
            Float(self.position.depth),
            Float(self.grid.i),
            Float(self.grid.j),
            Float(self.grid.k),
            Int(self.track.len() as u64),
            Float(self.env.temperature),
            Float(self.env.salinity),
            Float(self.env.bottom_depth),
            self.env.ph.map_or(ReportValue::Missing, Float),
        ];
        values.extend(
            self.stage
                .schema()
                .attributes
                .iter()
                .map(|a| self.attribute(*a)),
        );
        values
    }

    fn attribute(&self, attribute: Attribute) -> ReportValue {
        let s = &self.state;
        let spawning = self.spawning.as_ref();
        match attribute {
            Attribute::DevStage => ReportValue::Float(s.dev_stage),
            Attribute::MoltIndicator => ReportValue::Float(s.molt_indicator),
            Attribute::Size => ReportValue::Float(s.size),
            Attribute::Weight => ReportValue::Float(s.weight),
            Attribute::EggDiameter => ReportValue::Float(s.egg_diameter),
            Attribute::EggDensity => ReportValue::Float(s.egg_density),
            Attribute::Attached => ReportValue::Bool(self.attached),
            Attribute::StarvationDays => ReportValue::Float(s.starvation_days),
            Attribute::GonadStage => {
                spawning.map_or(ReportValue::Missing, |sp| ReportValue::Float(sp.gonad_stage()))
            }
            Attribute::SpawnBatches => spawning
                .map_or(ReportValue::Missing, |sp| ReportValue::Int(u64::from(sp.batches))),
            Attribute::TimeToSpawn => match spawning {
                Some(sp) if sp.time_to_spawn.is_finite() => ReportValue::Float(sp.time_to_spawn),
                _ => ReportValue::Missing,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Position, UniformField};
    use crate::registry::StageRegistry;

    #[test]
    fn header_and_values_line_up_for_every_stage() {
        let registry = StageRegistry::with_defaults().unwrap();
        let field = UniformField::default();
        for stage in StageType::all() {
            let e = CohortEntity::genesis(
                1,
                registry.get(*stage).unwrap(),
                10.0,
                Position::new(-165.0, 58.0, 10.0),
                &field,
            );
            let header = e.report_header();
            let values = e.report_values();
            assert_eq!(header.len(), values.len(), "{stage}");
            assert_eq!(&header[..COMMON_FIELDS.len()], COMMON_FIELDS);
        }
    }

    #[test]
    fn egg_row_carries_development() {
        let registry = StageRegistry::with_defaults().unwrap();
        let e = CohortEntity::genesis(
            3,
            registry.get(StageType::Egg).unwrap(),
            1.0,
            Position::new(-165.0, 58.0, 10.0),
            &UniformField::default(),
        );
        let header = e.report_header();
        let values = e.report_values();
        let at = |name: &str| {
            let i = header.iter().position(|h| *h == name).unwrap();
            values[i].clone()
        };
        assert_eq!(at("id"), ReportValue::Int(3));
        assert_eq!(at("stage"), ReportValue::Text("Egg".into()));
        assert_eq!(at("dev_stage"), ReportValue::Float(1.0));
        assert_eq!(at("ph"), ReportValue::Missing);
        assert_eq!(at("ph").to_string(), "NA");
    }

    #[test]
    fn values_serialize_flat() {
        let row = vec![ReportValue::Int(1), ReportValue::Bool(true), ReportValue::Float(0.5)];
        assert_eq!(serde_json::to_string(&row).unwrap(), "[1,true,0.5]");
    }
}
