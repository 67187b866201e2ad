use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{Division, DivisionMetadata};

/// Division metadata cache owned by a [`crate::engine::CostEngine`].
///
/// Seeded from configuration; divisions without configuration get
/// [`DivisionMetadata::default_for`] the first time they are requested.
/// Call [`DivisionCache::prepopulate`] before fanning calculations out across
/// threads so that lookups only ever take the read lock.
#[derive(Debug, Default)]
pub struct DivisionCache {
    entries: RwLock<HashMap<Division, Arc<DivisionMetadata>>>,
}

impl DivisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache seeded with configured metadata. Later entries for the same
    /// division replace earlier ones.
    pub fn with_metadata(metadata: impl IntoIterator<Item = DivisionMetadata>) -> Self {
        let entries = metadata
            .into_iter()
            .map(|meta| (meta.division(), Arc::new(meta)))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Metadata for a division, constructing and caching the default if absent.
    pub fn get(&self, division: Division) -> Arc<DivisionMetadata> {
        if let Some(meta) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&division)
        {
            return Arc::clone(meta);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(division)
                .or_insert_with(|| Arc::new(DivisionMetadata::default_for(division))),
        )
    }

    /// Fill the cache for every known division.
    pub fn prepopulate(&self) {
        for division in Division::ALL {
            self.get(division);
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
