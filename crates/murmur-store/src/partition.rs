use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::warn;

/// Channel id -> independently locked state.
///
/// The outer map lock is only taken for write when a channel is first seen,
/// so work on different channels never waits on the same mutex.
pub(crate) struct Partitions<T> {
    map: RwLock<HashMap<String, Arc<Mutex<T>>>>,
}

impl<T: Default> Partitions<T> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    fn existing(&self, channel_id: &str) -> Option<Arc<Mutex<T>>> {
        let map = self.map.read().unwrap_or_else(|e| {
            warn!("Partition map lock poisoned, recovering");
            e.into_inner()
        });
        map.get(channel_id).cloned()
    }

    fn get_or_create(&self, channel_id: &str) -> Arc<Mutex<T>> {
        if let Some(partition) = self.existing(channel_id) {
            return partition;
        }
        let mut map = self.map.write().unwrap_or_else(|e| {
            warn!("Partition map lock poisoned, recovering");
            e.into_inner()
        });
        map.entry(channel_id.to_string()).or_default().clone()
    }

    /// Run `f` on the channel's state, creating it on first use.
    pub fn with<F, R>(&self, channel_id: &str, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let partition = self.get_or_create(channel_id);
        let mut guard = lock(&partition, channel_id);
        f(&mut guard)
    }

    /// Run `f` on the channel's state if the channel exists.
    pub fn with_existing<F, R>(&self, channel_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let partition = self.existing(channel_id)?;
        let mut guard = lock(&partition, channel_id);
        Some(f(&mut guard))
    }

    /// Visit every channel, one partition lock at a time.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &mut T),
    {
        let partitions: Vec<(String, Arc<Mutex<T>>)> = {
            let map = self.map.read().unwrap_or_else(|e| e.into_inner());
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };
        for (channel_id, partition) in partitions {
            let mut guard = lock(&partition, &channel_id);
            f(&channel_id, &mut guard);
        }
    }
}

fn lock<'a, T>(partition: &'a Mutex<T>, channel_id: &str) -> MutexGuard<'a, T> {
    partition.lock().unwrap_or_else(|e| {
        warn!("Channel {} lock poisoned, recovering", channel_id);
        e.into_inner()
    })
}
