use std::collections::HashMap;
use std::sync::Mutex;

use common::metrics;
use domain::Order;
use tracing::debug;

/// Sentinel index for "no node".
const NIL: usize = usize::MAX;

struct Node {
    key: String,
    order: Order,
    prev: usize,
    next: usize,
}

/// Recency list state. Nodes live in an arena addressed by stable index;
/// `head` is most-recently-used, `tail` least-recently-used.
struct LruState {
    map: HashMap<String, usize>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

/// Bounded LRU cache of orders keyed by `order_uid`.
///
/// Entries are write-once: a `set` for a key that is already resident is a
/// no-op, leaving both the value and its recency position untouched. Cached
/// orders represent durably persisted facts, so redelivered duplicates must
/// never stomp a concurrent reader's view. Every `get` hit moves the entry
/// to the head of the recency list; inserting past capacity silently evicts
/// the tail (the store remains the durable copy of record).
///
/// All state transitions happen under a single mutex. A reader/writer split
/// would buy nothing here: recency movement makes every `get` a mutator, and
/// the critical section only chases in-memory indices, never I/O.
pub struct OrderCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl OrderCache {
    /// Create a cache holding at most `capacity` orders.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "cache capacity must be at least 1");
        Self {
            capacity,
            state: Mutex::new(LruState {
                map: HashMap::with_capacity(capacity),
                nodes: Vec::with_capacity(capacity),
                free: Vec::new(),
                head: NIL,
                tail: NIL,
            }),
        }
    }

    /// Insert an order under `key`. No-op if the key is already resident.
    /// Evicts the least-recently-used entry when the insert exceeds capacity.
    pub fn set(&self, key: &str, order: Order) {
        let mut state = self.state.lock().unwrap();

        if state.map.contains_key(key) {
            return;
        }

        let node = Node {
            key: key.to_string(),
            order,
            prev: NIL,
            next: NIL,
        };
        let idx = match state.free.pop() {
            Some(slot) => {
                state.nodes[slot] = Some(node);
                slot
            }
            None => {
                state.nodes.push(Some(node));
                state.nodes.len() - 1
            }
        };
        state.map.insert(key.to_string(), idx);
        state.push_front(idx);

        if state.map.len() > self.capacity {
            state.evict_tail();
        }
    }

    /// Look up an order. A hit marks the entry most-recently-used and
    /// returns a copy; a miss returns `None`.
    pub fn get(&self, key: &str) -> Option<Order> {
        let mut state = self.state.lock().unwrap();

        match state.map.get(key).copied() {
            Some(idx) => {
                metrics::CACHE_HITS_TOTAL.inc();
                state.unlink(idx);
                state.push_front(idx);
                Some(state.nodes[idx].as_ref().unwrap().order.clone())
            }
            None => {
                metrics::CACHE_MISSES_TOTAL.inc();
                None
            }
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LruState {
    /// Detach a node from the recency list, patching neighbour indices.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().unwrap();
            (node.prev, node.next)
        };
        if prev != NIL {
            self.nodes[prev].as_mut().unwrap().next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].as_mut().unwrap().prev = prev;
        } else {
            self.tail = prev;
        }
        let node = self.nodes[idx].as_mut().unwrap();
        node.prev = NIL;
        node.next = NIL;
    }

    /// Attach a detached node at the head (most-recently-used).
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.nodes[idx].as_mut().unwrap();
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.nodes[old_head].as_mut().unwrap().prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Drop the tail node and return its slot to the free list.
    fn evict_tail(&mut self) {
        let idx = self.tail;
        if idx == NIL {
            return;
        }
        self.unlink(idx);
        let node = self.nodes[idx].take().unwrap();
        self.map.remove(&node.key);
        self.free.push(idx);
        debug!(key = %node.key, "evicted least-recently-used order");
    }
}
