use ahash::AHashMap;
use planet_objects::{CelestialTemplate, EffectsTemplate, PlanetEntity, PlanetId};
use planet_utils::time::Millis;
use std::collections::BTreeSet;

/// Lowercased whitespace-separated tokens of a display name.
pub fn name_tokens(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split_whitespace().map(str::to_lowercase)
}

/// Secondary indices over the active tier.
///
/// Access order is keyed by `(timestamp, id)` so two planets touched in the
/// same millisecond both keep an entry; `access_key` holds each planet's
/// current key so a touch can drop the stale one.
#[derive(Debug, Default)]
pub struct PlanetIndices {
    by_token: AHashMap<String, BTreeSet<PlanetId>>,
    by_effects: AHashMap<EffectsTemplate, BTreeSet<PlanetId>>,
    by_celestial: AHashMap<CelestialTemplate, BTreeSet<PlanetId>>,
    access: BTreeSet<(Millis, PlanetId)>,
    access_key: AHashMap<PlanetId, Millis>,
}

impl PlanetIndices {
    pub fn insert(&mut self, entity: &PlanetEntity) {
        let id = entity.id();
        for token in name_tokens(entity.display_name()) {
            self.by_token.entry(token).or_default().insert(id.clone());
        }
        self.by_effects
            .entry(entity.effects())
            .or_default()
            .insert(id.clone());
        self.by_celestial
            .entry(entity.celestial())
            .or_default()
            .insert(id.clone());
        self.touch(id, entity.runtime.last_accessed);
    }

    /// Re-keys the access entry of `id`.
    pub fn touch(&mut self, id: &PlanetId, at: Millis) {
        if let Some(previous) = self.access_key.insert(id.clone(), at) {
            self.access.remove(&(previous, id.clone()));
        }
        self.access.insert((at, id.clone()));
    }

    pub fn remove(&mut self, entity: &PlanetEntity) {
        let id = entity.id();
        for token in name_tokens(entity.display_name()) {
            if let Some(ids) = self.by_token.get_mut(&token) {
                ids.remove(id);
                if ids.is_empty() {
                    self.by_token.remove(&token);
                }
            }
        }
        if let Some(ids) = self.by_effects.get_mut(&entity.effects()) {
            ids.remove(id);
        }
        if let Some(ids) = self.by_celestial.get_mut(&entity.celestial()) {
            ids.remove(id);
        }
        if let Some(at) = self.access_key.remove(id) {
            self.access.remove(&(at, id.clone()));
        }
    }

    pub fn clear(&mut self) {
        self.by_token.clear();
        self.by_effects.clear();
        self.by_celestial.clear();
        self.access.clear();
        self.access_key.clear();
    }

    /// Full clear-and-repopulate from the active tier.
    pub fn rebuild<'a>(&mut self, active: impl IntoIterator<Item = &'a PlanetEntity>) {
        self.clear();
        for entity in active {
            self.insert(entity);
        }
    }

    /// IDs whose name has a token containing `needle`.
    pub fn with_token_containing(&self, needle: &str) -> BTreeSet<PlanetId> {
        self.by_token
            .iter()
            .filter(|(token, _)| token.contains(needle))
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    pub fn with_effects(&self, effects: EffectsTemplate) -> Vec<PlanetId> {
        self.by_effects
            .get(&effects)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn with_celestial(&self, celestial: CelestialTemplate) -> Vec<PlanetId> {
        self.by_celestial
            .get(&celestial)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Oldest access first.
    pub fn by_access(&self) -> impl DoubleEndedIterator<Item = &(Millis, PlanetId)> {
        self.access.iter()
    }

    pub fn tracked(&self) -> usize {
        self.access_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_objects::PlanetDescriptor;

    fn entity(sequence: u32, name: &str, at: Millis) -> PlanetEntity {
        let descriptor = PlanetDescriptor::from_defaults(
            PlanetId::from_sequence(sequence),
            name.to_string(),
            EffectsTemplate::Rocky,
            CelestialTemplate::TwoMoons,
            300,
        );
        PlanetEntity::new(descriptor, at)
    }

    #[test]
    fn test_equal_timestamps_keep_both_entries() {
        let mut indices = PlanetIndices::default();
        indices.insert(&entity(1, "Nova Prime", 500));
        indices.insert(&entity(2, "Nova Minor", 500));
        assert_eq!(indices.by_access().count(), 2);
        assert_eq!(indices.with_token_containing("nova").len(), 2);
    }

    #[test]
    fn test_touch_rekeys_single_entry() {
        let mut indices = PlanetIndices::default();
        let a = entity(1, "Ross-1200c", 10);
        indices.insert(&a);
        indices.touch(a.id(), 20);
        indices.touch(a.id(), 30);
        let keys: Vec<_> = indices.by_access().cloned().collect();
        assert_eq!(keys, vec![(30, a.id().clone())]);
        assert_eq!(indices.tracked(), 1);
    }

    #[test]
    fn test_remove_and_rebuild() {
        let mut indices = PlanetIndices::default();
        let a = entity(1, "Wolf 359 b", 10);
        let b = entity(2, "Wolf 1061 c", 20);
        indices.insert(&a);
        indices.insert(&b);
        indices.remove(&a);
        assert_eq!(indices.with_token_containing("wolf"), BTreeSet::from([b.id().clone()]));
        assert_eq!(indices.with_effects(EffectsTemplate::Rocky), vec![b.id().clone()]);
        assert!(indices.with_token_containing("359").is_empty());

        indices.rebuild([&a, &b]);
        assert_eq!(indices.with_celestial(CelestialTemplate::TwoMoons).len(), 2);
        assert_eq!(indices.tracked(), 2);
    }
}
