//! Live updates pushed to every subscribed pager.
//!
//! Each pager receives every patch on its own receiver and keeps only those
//! addressed to nodes it holds; there is no shared state between pagers.

use crate::{
    entity::EntityPatch, node::Node, query::QueryKey, store::Pager, PagerError, PagerResult,
};
use feed_pager_lib::config::LiveConfig;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Fan-out channel for pushed patches.
#[derive(Clone)]
pub struct LiveChannel {
    sender: broadcast::Sender<EntityPatch>,
}

impl LiveChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn from_config(config: &LiveConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Deliver a patch to every current subscriber. Returns how many received it.
    pub fn publish(&self, patch: EntityPatch) -> usize {
        match self.sender.send(patch) {
            Ok(n) => n,
            Err(broadcast::error::SendError(patch)) => {
                debug!("No subscribers for {} {}", patch.typename(), patch.id());
                0
            }
        }
    }

    pub fn receiver(&self) -> broadcast::Receiver<EntityPatch> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Live subscriptions, at most one per query.
///
/// Subscriptions end with [`SubscriptionRegistry::unsubscribe`] or when the
/// registry is dropped.
pub struct SubscriptionRegistry {
    channel: LiveChannel,
    enabled: bool,
    tasks: Mutex<HashMap<QueryKey, JoinHandle<()>>>,
}

impl SubscriptionRegistry {
    pub fn new(channel: LiveChannel, config: &LiveConfig) -> Self {
        Self {
            channel,
            enabled: config.enabled,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<QueryKey, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Forward live patches to `pager` until unsubscribed.
    ///
    /// Returns `Ok(false)` when live updates are disabled. Must be called from
    /// within a tokio runtime.
    pub fn subscribe<N: Node>(&self, pager: Arc<Pager<N>>) -> PagerResult<bool> {
        if !self.enabled {
            debug!("Live updates disabled, not subscribing Pager({})", pager.query());
            return Ok(false);
        }

        let key = pager.query().clone();
        let mut tasks = self.tasks();
        if tasks.get(&key).is_some_and(|task| !task.is_finished()) {
            return Err(PagerError::AlreadySubscribed(key.to_string()));
        }

        let mut receiver = self.channel.receiver();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(patch) => {
                        if pager.apply_entity_patch(&patch) {
                            debug!(
                                "Pager({}) reconciled {} {}",
                                pager.query(),
                                patch.typename(),
                                patch.id()
                            );
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Pager({}) missed {skipped} live patches", pager.query());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        info!("Subscribed Pager({key}) to live updates");
        tasks.insert(key, task);
        Ok(true)
    }

    /// End the subscription for `key`. Returns whether one existed.
    pub fn unsubscribe(&self, key: &QueryKey) -> bool {
        match self.tasks().remove(key) {
            Some(task) => {
                task.abort();
                info!("Unsubscribed Pager({key}) from live updates");
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, key: &QueryKey) -> bool {
        self.tasks()
            .get(key)
            .is_some_and(|task| !task.is_finished())
    }

    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        for (_, task) in self.tasks().drain() {
            task.abort();
        }
    }
}
