//! Realtime change feed.
//!
//! Publishers push [`ChangeEvent`]s into a shared [`ChangeFeed`]; every
//! [`Subscription`] whose filter matches receives a copy on its own channel.
//! Dropping a subscription unsubscribes it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent<T> {
    pub channel: String,
    pub kind: ChangeKind,
    pub payload: T,
}

impl<T> ChangeEvent<T> {
    pub fn new(channel: impl Into<String>, kind: ChangeKind, payload: T) -> Self {
        Self {
            channel: channel.into(),
            kind,
            payload,
        }
    }
}

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub channel: String,
    /// `None` matches every kind
    pub kind: Option<ChangeKind>,
}

impl ChangeFilter {
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ChangeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches<T>(&self, event: &ChangeEvent<T>) -> bool {
        self.channel == event.channel && self.kind.map_or(true, |k| k == event.kind)
    }
}

struct Subscriber<T> {
    id: u64,
    filter: ChangeFilter,
    tx: mpsc::Sender<ChangeEvent<T>>,
}

struct FeedInner<T> {
    subscribers: Mutex<Vec<Subscriber<T>>>,
    next_id: AtomicU64,
}

impl<T> FeedInner<T> {
    fn lock(&self) -> MutexGuard<'_, Vec<Subscriber<T>>> {
        // A panicked publisher leaves the list itself intact
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn unsubscribe(&self, id: u64) {
        self.lock().retain(|s| s.id != id);
    }
}

/// Cloneable handle to one change feed.
pub struct ChangeFeed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for ChangeFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Default for ChangeFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> ChangeFeed<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn subscribe(&self, filter: ChangeFilter) -> Subscription<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel();
        log::debug!("subscription {} opened on {}", id, filter.channel);
        self.inner.lock().push(Subscriber { id, filter, tx });
        Subscription {
            id,
            rx: Some(rx),
            feed: Arc::clone(&self.inner),
        }
    }

    /// Deliver `event` to every matching subscriber. Returns the delivery count.
    pub fn publish(&self, event: ChangeEvent<T>) -> usize {
        let mut subscribers = self.inner.lock();
        let mut delivered = 0;
        subscribers.retain(|s| {
            if !s.filter.matches(&event) {
                return true;
            }
            match s.tx.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                // Receiver gone without an explicit close
                Err(_) => false,
            }
        });
        log::trace!("{:?} on {} delivered to {}", event.kind, event.channel, delivered);
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().len()
    }
}

/// Open subscription. Dropping it releases the slot in the feed.
pub struct Subscription<T> {
    id: u64,
    rx: Option<mpsc::Receiver<ChangeEvent<T>>>,
    feed: Arc<FeedInner<T>>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    /// Next pending event, without blocking.
    pub fn try_next(&self) -> Option<ChangeEvent<T>> {
        self.rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }

    /// Every pending event, in delivery order.
    pub fn drain(&self) -> Vec<ChangeEvent<T>> {
        match &self.rx {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn close(&mut self) {
        if self.rx.take().is_some() {
            self.feed.unsubscribe(self.id);
            log::debug!("subscription {} closed", self.id);
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        let ev = ChangeEvent::new("comments:1", ChangeKind::Insert, ());
        assert!(ChangeFilter::channel("comments:1").matches(&ev));
        assert!(ChangeFilter::channel("comments:1")
            .with_kind(ChangeKind::Insert)
            .matches(&ev));
        assert!(!ChangeFilter::channel("comments:1")
            .with_kind(ChangeKind::Delete)
            .matches(&ev));
        assert!(!ChangeFilter::channel("comments:2").matches(&ev));
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_in_order() {
        let feed = ChangeFeed::new();
        let a = feed.subscribe(ChangeFilter::channel("party:1"));
        let b = feed.subscribe(ChangeFilter::channel("party:2"));

        assert_eq!(feed.publish(ChangeEvent::new("party:1", ChangeKind::Insert, 1)), 1);
        assert_eq!(feed.publish(ChangeEvent::new("party:1", ChangeKind::Update, 2)), 1);

        let got: Vec<i32> = a.drain().into_iter().map(|e| e.payload).collect();
        assert_eq!(got, vec![1, 2]);
        assert!(b.try_next().is_none());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let feed: ChangeFeed<u8> = ChangeFeed::new();
        {
            let _sub = feed.subscribe(ChangeFilter::channel("x"));
            assert_eq!(feed.subscriber_count(), 1);
        }
        assert_eq!(feed.subscriber_count(), 0);
        assert_eq!(feed.publish(ChangeEvent::new("x", ChangeKind::Insert, 0)), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let feed: ChangeFeed<u8> = ChangeFeed::new();
        let mut sub = feed.subscribe(ChangeFilter::channel("x"));
        sub.close();
        sub.close();
        assert!(!sub.is_open());
        assert!(sub.try_next().is_none());
        assert!(sub.drain().is_empty());
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn test_cross_thread_publish() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(ChangeFilter::channel("party:7"));
        let publisher = feed.clone();
        std::thread::spawn(move || {
            for i in 0..10 {
                publisher.publish(ChangeEvent::new("party:7", ChangeKind::Insert, i));
            }
        })
        .join()
        .unwrap();
        let got: Vec<u32> = sub.drain().into_iter().map(|e| e.payload).collect();
        assert_eq!(got, (0..10).collect::<Vec<_>>());
    }
}
