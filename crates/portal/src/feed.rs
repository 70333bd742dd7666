//! Per-owner live collection feeds.
//!
//! Each owner gets a `watch` channel carrying the whole collection. Writers
//! re-read the collection after every successful write and publish it;
//! subscribers see the latest snapshot and are woken on change.
//!
//! Reads that feed a channel (a refresh or a first subscribe) are serialized
//! per owner, so a snapshot can never overwrite one read after it. An owner's
//! entry is dropped once nobody subscribes to it and no read is in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, Mutex as AsyncMutex};

/// An immutable view of a collection at one point in time.
pub type Snapshot<T> = Arc<Vec<T>>;

struct Owner<T> {
    sender: Option<watch::Sender<Snapshot<T>>>,
    reads: Arc<AsyncMutex<()>>,
}

impl<T> Owner<T> {
    fn new() -> Self {
        Self {
            sender: None,
            reads: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Nobody watches and nobody holds or waits on the read lock.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.reads) == 1
            && self
                .sender
                .as_ref()
                .map_or(true, |sender| sender.receiver_count() == 0)
    }
}

/// Live collections keyed by owner id.
pub struct Feed<T> {
    owners: Mutex<HashMap<String, Owner<T>>>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            owners: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> std::fmt::Debug for Feed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owners = self.lock().len();
        f.debug_struct("Feed").field("owners", &owners).finish()
    }
}

impl<T> Feed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Owner<T>>> {
        self.owners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read lock for `owner`. Clones are only taken under the map lock.
    fn reads(&self, owner: &str) -> Arc<AsyncMutex<()>> {
        self.lock()
            .entry(owner.to_string())
            .or_insert_with(Owner::new)
            .reads
            .clone()
    }

    /// Give back a read lock and drop the owner's entry if it went idle.
    fn release(&self, owner: &str, reads: Arc<AsyncMutex<()>>) {
        let mut owners = self.lock();
        drop(reads);
        if owners.get(owner).is_some_and(Owner::is_idle) {
            owners.remove(owner);
        }
    }

    /// Re-read the owner's collection with `load` and wake every subscriber.
    ///
    /// Refreshes for one owner run one at a time, so the last one to finish
    /// publishes the newest read. With no subscribers the snapshot is
    /// discarded; the next subscriber loads its own.
    pub async fn refresh<F, Fut, E>(&self, owner: &str, load: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let reads = self.reads(owner);
        let result = {
            let _guard = reads.lock().await;
            load().await.map(|items| {
                if let Some(sender) = self.lock().get(owner).and_then(|o| o.sender.as_ref()) {
                    sender.send_replace(Arc::new(items));
                }
            })
        };
        self.release(owner, reads);
        result
    }

    /// Subscribe to the owner's collection.
    ///
    /// `load` supplies the initial snapshot and is only called when nobody
    /// is subscribed to this owner yet. The first [`Subscription::next`]
    /// returns the current snapshot immediately.
    pub async fn subscribe<F, Fut, E>(&self, owner: &str, load: F) -> Result<Subscription<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(receiver) = self.existing(owner) {
            return Ok(Subscription::delivered(receiver));
        }

        let reads = self.reads(owner);
        let result = {
            let _guard = reads.lock().await;
            self.open(owner, load).await
        };
        self.release(owner, reads);
        result.map(Subscription::delivered)
    }

    /// Open the owner's channel with a fresh load. Called with the read lock held.
    async fn open<F, Fut, E>(&self, owner: &str, load: F) -> Result<watch::Receiver<Snapshot<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        // Another subscriber may have loaded while this one waited.
        if let Some(receiver) = self.existing(owner) {
            return Ok(receiver);
        }

        let snapshot = Arc::new(load().await?);
        let mut owners = self.lock();
        let entry = owners.entry(owner.to_string()).or_insert_with(Owner::new);
        if let Some(sender) = &entry.sender {
            sender.send_replace(snapshot);
            return Ok(sender.subscribe());
        }
        let (sender, receiver) = watch::channel(snapshot);
        entry.sender = Some(sender);
        Ok(receiver)
    }

    /// A receiver on a channel that still has subscribers.
    fn existing(&self, owner: &str) -> Option<watch::Receiver<Snapshot<T>>> {
        self.lock()
            .get(owner)
            .and_then(|o| o.sender.as_ref())
            .filter(|sender| sender.receiver_count() > 0)
            .map(watch::Sender::subscribe)
    }

    /// Live subscriptions for `owner`.
    pub fn subscriber_count(&self, owner: &str) -> usize {
        self.lock()
            .get(owner)
            .and_then(|o| o.sender.as_ref())
            .map_or(0, watch::Sender::receiver_count)
    }

    #[cfg(test)]
    fn owner_count(&self) -> usize {
        self.lock().len()
    }
}

/// A live view of one owner's collection. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T> Subscription<T> {
    /// Subscription whose current value counts as not yet seen.
    fn delivered(mut receiver: watch::Receiver<Snapshot<T>>) -> Self {
        receiver.mark_changed();
        Self { receiver }
    }

    /// Subscription that waits for the next send before yielding.
    #[cfg(test)]
    pub(crate) fn pending(receiver: watch::Receiver<Snapshot<T>>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot, without waiting.
    pub fn current(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for a snapshot not yet returned by this subscription.
    ///
    /// Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
