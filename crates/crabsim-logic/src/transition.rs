//! Transition and lineage management.
//!
//! | Mode | Successor ids | Successor number | Triggering entity |
//! |------|---------------|------------------|-------------------|
//! | super-individual | fresh id, parent = trigger id | `num_trans` | stays alive, `num_trans = 0` |
//! | single individual | inherits id, parent, orig | `number` | dead (`Transitioned`) |
//! | sex-ratio branch | fresh id per branch, parent = trigger id | female `(1-x)n`, male `xn` | as for its mode |
//!
//! `orig_id` is carried unchanged in every case. Spawned offspring are new
//! lineage roots parented to their spawner.

use crate::context::LineageIds;
use crate::entity::{CohortEntity, DeathCause};
use crate::error::ConfigError;
use crate::registry::StageRegistry;
use crate::stages::StageType;

/// Split `n` over the successor stages of `stage`: female first for a sex-ratio branch.
pub fn branch_numbers(successors: &[StageType], n: f64, sex_ratio: f64) -> Vec<(StageType, f64)> {
    match successors {
        [only] => vec![(*only, n)],
        [female, male] => vec![(*female, (1.0 - sex_ratio) * n), (*male, sex_ratio * n)],
        _ => Vec::new(),
    }
}

/// Create the successors of a triggering entity and update the entity.
///
/// Returns an empty list if nothing is ready: a dead or terminal-stage entity,
/// or a super-individual with no committed abundance. Branches whose share
/// of the abundance is zero are not created.
pub fn pending_transitions(
    entity: &mut CohortEntity,
    registry: &StageRegistry,
    ids: &mut dyn LineageIds,
) -> Result<Vec<CohortEntity>, ConfigError> {
    let schema = entity.stage.schema();
    if !entity.is_alive() || schema.successors.is_empty() {
        return Ok(Vec::new());
    }
    let stage = registry.get(entity.stage)?;
    let abundance = if entity.super_individual {
        entity.num_trans
    } else {
        entity.number
    };
    if abundance <= 0.0 {
        return Ok(Vec::new());
    }

    let branches = branch_numbers(schema.successors, abundance, stage.sex_ratio);
    let fresh_ids = entity.super_individual || schema.branches_by_sex();
    let mut created = Vec::with_capacity(branches.len());
    for (next_stage, number) in branches {
        if number <= 0.0 {
            continue;
        }
        let bound = registry.get(next_stage)?;
        let mut next = CohortEntity::successor_of(entity, bound, number);
        if fresh_ids {
            next.set_lineage(ids.next_id(), entity.id, entity.orig_id);
        }
        log::debug!(
            "entity {} ({}) -> entity {} ({}), number {:.3}",
            entity.id,
            entity.stage,
            next.id,
            next.stage,
            number
        );
        created.push(next);
    }

    if entity.super_individual {
        entity.num_trans = 0.0;
    } else {
        entity.kill(DeathCause::Transitioned);
    }
    Ok(created)
}

/// Release one batch of offspring from a spawning entity into its pending buffer.
///
/// Batch size comes from the stage's fecundity function of the spawner's size.
/// Each offspring starts a new lineage: `orig_id` is its own id and
/// `parent_id` is the spawner's. Returns the number of offspring created.
pub fn spawn_batch(
    entity: &mut CohortEntity,
    registry: &StageRegistry,
    ids: &mut dyn LineageIds,
) -> Result<usize, ConfigError> {
    let stage = registry.get(entity.stage)?;
    let Some(&spawned_stage) = entity.stage.schema().spawned.first() else {
        return Ok(0);
    };
    let count = stage
        .fecundity
        .as_ref()
        .map_or(0, |f| f.batch_size(entity.state.size));
    let offspring_stage = registry.get(spawned_stage)?;
    for _ in 0..count {
        let mut child = CohortEntity::offspring_of(entity, offspring_stage);
        let id = ids.next_id();
        child.set_lineage(id, entity.id, id);
        entity.push_spawned(child);
    }
    log::debug!(
        "entity {} ({}) spawned {} {}",
        entity.id,
        entity.stage,
        count,
        spawned_stage
    );
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SequentialIds;
    use crate::field::{Position, UniformField};

    fn entity(registry: &StageRegistry, stage: StageType, number: f64) -> CohortEntity {
        let mut e = CohortEntity::genesis(
            5,
            registry.get(stage).unwrap(),
            number,
            Position::new(-165.0, 58.0, 30.0),
            &UniformField::default(),
        );
        e.set_lineage(5, 4, 1);
        e
    }

    #[test]
    fn branch_numbers_split_by_sex_ratio() {
        let split = branch_numbers(
            &[StageType::ImmatureFemale, StageType::ImmatureMale],
            10.0,
            0.3,
        );
        assert_eq!(split[0].0, StageType::ImmatureFemale);
        assert!((split[0].1 - 7.0).abs() < 1e-12);
        assert!((split[1].1 - 3.0).abs() < 1e-12);
        assert!(branch_numbers(&[], 1.0, 0.5).is_empty());
    }

    #[test]
    fn super_individual_splits_off_num_trans() {
        let registry = StageRegistry::with_defaults().unwrap();
        let mut ids = SequentialIds::starting_at(50);
        let mut e = entity(&registry, StageType::Zoea1, 100.0);
        e.num_trans = 12.0;
        let out = pending_transitions(&mut e, &registry, &mut ids).unwrap();
        assert_eq!(out.len(), 1);
        let next = &out[0];
        assert_eq!(next.stage, StageType::Zoea2);
        assert_eq!(next.number, 12.0);
        assert_eq!((next.id, next.parent_id, next.orig_id), (50, 5, 1));
        assert!(e.is_alive());
        assert_eq!(e.num_trans, 0.0);
        assert_eq!(e.number, 100.0);
    }

    #[test]
    fn super_individual_without_committed_abundance_creates_nothing() {
        let registry = StageRegistry::with_defaults().unwrap();
        let mut ids = SequentialIds::default();
        let mut e = entity(&registry, StageType::Zoea1, 100.0);
        assert!(pending_transitions(&mut e, &registry, &mut ids)
            .unwrap()
            .is_empty());
        assert_eq!(ids.peek(), 0);
    }

    #[test]
    fn single_individual_converts_in_place() {
        let registry = StageRegistry::with_defaults().unwrap();
        let mut ids = SequentialIds::starting_at(50);
        let mut e = entity(&registry, StageType::Egg, 1.0);
        assert!(!e.super_individual);
        let out = pending_transitions(&mut e, &registry, &mut ids).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].id, out[0].parent_id, out[0].orig_id), (5, 4, 1));
        assert_eq!(out[0].stage, StageType::Zoea1);
        assert!(!e.is_alive() && !e.is_active());
        assert_eq!(e.death, Some(DeathCause::Transitioned));
        // no id consumed
        assert_eq!(ids.peek(), 50);
        // a second call finds a dead entity
        assert!(pending_transitions(&mut e, &registry, &mut ids)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn sex_ratio_branch_gets_fresh_ids_in_single_mode() {
        let registry = StageRegistry::with_defaults().unwrap();
        let mut ids = SequentialIds::starting_at(50);
        let mut e = entity(&registry, StageType::Juvenile, 8.0);
        e.super_individual = false;
        let out = pending_transitions(&mut e, &registry, &mut ids).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].stage, StageType::ImmatureFemale);
        assert_eq!(out[1].stage, StageType::ImmatureMale);
        assert_eq!((out[0].id, out[1].id), (50, 51));
        assert!(out.iter().all(|s| s.parent_id == 5 && s.orig_id == 1));
        assert!((out[0].number + out[1].number - 8.0).abs() < 1e-12);
        assert!(!e.is_alive());
    }

    #[test]
    fn spawned_eggs_are_new_lineage_roots() {
        let registry = StageRegistry::with_defaults().unwrap();
        let mut ids = SequentialIds::starting_at(200);
        let mut female = entity(&registry, StageType::MatureFemale, 3.0);
        female.state.size = 60.0;
        // 0.002 * 60^2 = 7.2 eggs
        let n = spawn_batch(&mut female, &registry, &mut ids).unwrap();
        assert_eq!(n, 7);
        let eggs = female.pending_spawned();
        assert_eq!(eggs.len(), 7);
        for (k, egg) in eggs.iter().enumerate() {
            let id = 200 + k as u64;
            assert_eq!((egg.id, egg.parent_id, egg.orig_id), (id, 5, id));
            assert_eq!(egg.stage, StageType::Egg);
            assert_eq!(egg.number, 1.0);
            assert_eq!(egg.age, 0.0);
            assert_eq!(egg.state.dev_stage, 1.0);
            assert_eq!(egg.position, female.position);
        }
        assert!(female.pending_spawned().is_empty());
    }
}
