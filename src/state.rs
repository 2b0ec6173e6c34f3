//! Bookkeeping for clients blocked on list keys.
//!
//! Every key has its own FIFO queue of subscribers. A subscriber owns the
//! sending half of a oneshot channel; the blocked client awaits the receiving
//! half. `State` is only ever touched while the owning `KeyValueStore` is
//! locked, which makes registration, fulfillment and cancellation atomic with
//! the list mutations around them.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use tokio::sync::{oneshot, watch};

/// A client blocked on a key, waiting for one element.
#[derive(Debug)]
pub struct Subscriber {
    pub id: u64,
    sender: oneshot::Sender<Bytes>,
}

impl Subscriber {
    /// Hands `value` to the waiting client. If the client already went away
    /// the value is given back.
    pub fn deliver(self, value: Bytes) -> Result<(), Bytes> {
        self.sender.send(value)
    }

    fn is_gone(&self) -> bool {
        self.sender.is_closed()
    }
}

#[derive(Debug, Default)]
pub struct State {
    subscribers: HashMap<Bytes, VecDeque<Subscriber>>,
    next_subscriber_id: u64,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a new subscriber at the back of `key`'s queue.
    ///
    /// Returns the subscriber id, needed to cancel the registration, and the
    /// receiver the delivered element will arrive on.
    pub fn add_subscriber(&mut self, key: Bytes) -> (u64, oneshot::Receiver<Bytes>) {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;

        self.subscribers
            .entry(key)
            .or_default()
            .push_back(Subscriber { id, sender });

        (id, receiver)
    }

    /// Removes the subscriber `id` from `key`'s queue.
    ///
    /// Returns `false` when it is no longer queued, meaning it has already been
    /// handed an element.
    pub fn remove_subscriber(&mut self, key: &[u8], id: u64) -> bool {
        let Some(queue) = self.subscribers.get_mut(key) else {
            return false;
        };

        let Some(position) = queue.iter().position(|subscriber| subscriber.id == id) else {
            return false;
        };

        queue.remove(position);

        if queue.is_empty() {
            self.subscribers.remove(key);
        }

        true
    }

    /// Dequeues the longest-waiting subscriber of `key` that is still listening.
    pub fn pop_subscriber(&mut self, key: &[u8]) -> Option<Subscriber> {
        let queue = self.subscribers.get_mut(key)?;
        let mut next = None;

        while let Some(subscriber) = queue.pop_front() {
            if !subscriber.is_gone() {
                next = Some(subscriber);
                break;
            }
        }

        if queue.is_empty() {
            self.subscribers.remove(key);
        }

        next
    }

    pub fn subscriber_count(&self, key: &[u8]) -> usize {
        self.subscribers.get(key).map_or(0, VecDeque::len)
    }
}

/// Fires once the client that issued a command has gone away.
///
/// The connection task keeps the sending half and flips it when its socket
/// reaches EOF, so a blocked client can give up its place in the queue.
#[derive(Debug, Clone)]
pub struct DisconnectSignal {
    receiver: watch::Receiver<bool>,
}

impl DisconnectSignal {
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(false);
        (sender, Self { receiver })
    }

    /// A signal that never fires, for callers without a client connection.
    pub fn never() -> Self {
        Self::channel().1
    }

    pub fn is_disconnected(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes when the client disconnects. Pends forever if the sending
    /// half is dropped without reporting a disconnect.
    pub async fn wait(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }

            if self.receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
