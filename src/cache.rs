//! The navigation cache.
//!
//! Memoizes the derived state at every visited scene index. A jump to an
//! arbitrary index replays only the transitions between the nearest cached
//! ancestor and the target, caching every intermediate along the way, so
//! local back-and-forth navigation costs one lookup instead of a full
//! replay from scene zero.
//!
//! Snapshots are deep-copied on the way in and on the way out: no cache
//! entry shares mutable storage with another entry or with anything a
//! caller holds. The index-0 initial snapshot is always present as the
//! replay floor.

use std::collections::BTreeMap;

use crate::engine::SceneEngine;
use crate::error::{ConfigError, VizResult};
use crate::state::ProgramState;

/// Scene-index-keyed snapshot store with nearest-ancestor replay.
#[derive(Debug, Clone)]
pub struct SceneCache {
    snapshots: BTreeMap<usize, ProgramState>,
}

impl SceneCache {
    /// Creates a cache seeded with the index-0 initial snapshot.
    #[must_use]
    pub fn new() -> Self {
        let mut snapshots = BTreeMap::new();
        snapshots.insert(0, ProgramState::initial());
        Self { snapshots }
    }

    /// Number of cached snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Never true: the initial snapshot is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// True when the exact index is cached.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.snapshots.contains_key(&index)
    }

    /// Returns the state after scene `target`, replaying forward from the
    /// nearest cached ancestor on a miss and caching every intermediate.
    ///
    /// The returned snapshot is an independent deep copy; mutating it
    /// cannot corrupt the cache.
    ///
    /// # Errors
    ///
    /// [`ConfigError::SceneIndexOutOfRange`] when `target` is not a valid
    /// scene index (callers clamp first); derivation errors from the engine
    /// are propagated.
    pub fn state_at(&mut self, engine: &SceneEngine, target: usize) -> VizResult<ProgramState> {
        let scene_count = engine.script().len();
        if target >= scene_count {
            return Err(ConfigError::SceneIndexOutOfRange {
                index: target,
                scene_count,
            }
            .into());
        }

        if let Some(snapshot) = self.snapshots.get(&target) {
            return Ok(snapshot.clone());
        }

        // The greatest cached index at or before the target; index 0 is
        // always present, so the lookup cannot miss.
        let (&nearest, snapshot) = self
            .snapshots
            .range(..=target)
            .next_back()
            .expect("cache always holds the initial snapshot");

        let mut state = snapshot.clone();
        for index in (nearest + 1)..=target {
            state = engine.apply(&state, index)?;
            self.snapshots.insert(index, state.clone());
        }
        Ok(state)
    }

    /// Drops every cached entry except the index-0 initial snapshot.
    pub fn invalidate_all(&mut self) {
        self.snapshots.retain(|&index, _| index == 0);
    }
}

impl Default for SceneCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SceneScript;
    use std::sync::Arc;

    fn engine() -> SceneEngine {
        SceneEngine::new(Arc::new(SceneScript::load().unwrap()))
    }

    #[test]
    fn test_initial_snapshot_is_the_floor() {
        let cache = SceneCache::new();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(0));
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_miss_fills_every_intermediate() {
        let engine = engine();
        let mut cache = SceneCache::new();
        let state = cache.state_at(&engine, 9).unwrap();
        assert_eq!(state.scene_index, 9);
        for index in 0..=9 {
            assert!(cache.contains(index), "missing intermediate {index}");
        }
        assert!(!cache.contains(10));
    }

    #[test]
    fn test_hit_returns_an_independent_copy() {
        let engine = engine();
        let mut cache = SceneCache::new();
        let mut first = cache.state_at(&engine, 11).unwrap();
        first.device.shared_log.push("corruption".to_string());

        let second = cache.state_at(&engine, 11).unwrap();
        assert!(!second.device.shared_log.contains(&"corruption".to_string()));
    }

    #[test]
    fn test_replay_from_nearest_ancestor_matches_full_replay() {
        let engine = engine();

        // Cached path: jump ahead, then land in between.
        let mut cache = SceneCache::new();
        let _ = cache.state_at(&engine, 6).unwrap();
        let via_cache = cache.state_at(&engine, 12).unwrap();

        // Uncached path: straight replay from zero.
        let mut cold = SceneCache::new();
        let via_replay = cold.state_at(&engine, 12).unwrap();

        assert_eq!(via_cache, via_replay);
        assert_eq!(via_cache.fingerprint(), via_replay.fingerprint());
    }

    #[test]
    fn test_out_of_range_target_is_a_config_error() {
        let engine = engine();
        let mut cache = SceneCache::new();
        let err = cache.state_at(&engine, 16).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalidate_all_keeps_only_the_floor() {
        let engine = engine();
        let mut cache = SceneCache::new();
        let _ = cache.state_at(&engine, 15).unwrap();
        assert_eq!(cache.len(), 16);

        cache.invalidate_all();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(0));

        // Still fully usable afterwards.
        let state = cache.state_at(&engine, 3).unwrap();
        assert_eq!(state.scene_index, 3);
    }
}
