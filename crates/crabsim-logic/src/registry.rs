//! Bound parameter sets for every stage type in a run.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::params::{BoundStage, StageParameters};
use crate::stages::StageType;

#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: BTreeMap<StageType, BoundStage>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in parameter set of every stage.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for stage in StageType::all() {
            registry.bind(&StageParameters::defaults(*stage))?;
        }
        Ok(registry)
    }

    /// Bind `params` and store the result, replacing any earlier binding.
    pub fn bind(&mut self, params: &StageParameters) -> Result<(), ConfigError> {
        let bound = params.bind()?;
        if let Some(previous) = self.stages.get(&params.stage) {
            if *previous != bound {
                log::warn!("{}: parameter set rebound with changed values", params.stage);
            }
        }
        self.stages.insert(params.stage, bound);
        Ok(())
    }

    pub fn get(&self, stage: StageType) -> Result<&BoundStage, ConfigError> {
        self.stages
            .get(&stage)
            .ok_or(ConfigError::NotRegistered(stage))
    }

    pub fn contains(&self, stage: StageType) -> bool {
        self.stages.contains_key(&stage)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::params as p;

    #[test]
    fn defaults_cover_every_stage() {
        let registry = StageRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), StageType::all().len());
        for stage in StageType::all() {
            assert_eq!(registry.get(*stage).unwrap().stage, *stage);
        }
    }

    #[test]
    fn missing_stage_is_a_config_error() {
        let registry = StageRegistry::new();
        assert_eq!(
            registry.get(StageType::Egg),
            Err(ConfigError::NotRegistered(StageType::Egg))
        );
    }

    #[test]
    fn rebinding_replaces() {
        let mut registry = StageRegistry::with_defaults().unwrap();
        let mut params = StageParameters::defaults(StageType::Zoea1);
        params.set_float(p::MAX_STAGE_DURATION, 99.0);
        registry.bind(&params).unwrap();
        assert_eq!(
            registry.get(StageType::Zoea1).unwrap().max_stage_duration,
            99.0
        );
    }

    #[test]
    fn failed_bind_keeps_previous() {
        let mut registry = StageRegistry::with_defaults().unwrap();
        let mut params = StageParameters::defaults(StageType::Juvenile);
        params.set_float(p::SEX_RATIO, -0.1);
        assert!(registry.bind(&params).is_err());
        assert_eq!(registry.get(StageType::Juvenile).unwrap().sex_ratio, 0.5);
    }
}
