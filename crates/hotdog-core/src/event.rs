//! Outbound state-change events with pre-allocated ring buffers.
//!
//! Phase handlers emit events while they run; the controller delivers the
//! buffered events to subscribers at the end of every call, oldest first.
//! This is the one surface the presentation layer (sprites, audio cues,
//! popups) observes. The core never calls into it otherwise.
//!
//! # Subscribers
//!
//! - **Per-kind listeners** receive one [`EventKind`].
//! - **Catch-all listeners** receive every kind.
//!
//! Both run in `(priority, registration order)` order and may carry a filter.
//!
//! # Suppression
//!
//! Kinds can be suppressed via [`EventBus::suppress`]; suppressed events are
//! never buffered. Hosts that poll state instead of listening (or that do
//! not care about per-stroke gauge updates) suppress the noisy kinds.

use crate::id::{FillingId, ItemId};
use crate::item::{FryingColor, OrderSpec, SauceKind};
use crate::phase::Phase;
use crate::zone::{Point, Station};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CookingEvent {
    // -- Session --
    SessionStarted {
        order: OrderSpec,
    },
    SessionFinished {
        score: u32,
    },
    SessionAbandoned,
    PhaseChanged {
        from: Phase,
        to: Phase,
    },

    // -- Item --
    ItemCreated {
        item: ItemId,
    },
    ItemPlaced {
        item: ItemId,
        station: Station,
    },
    ItemReverted {
        item: ItemId,
        to: Point,
    },
    ItemDiscarded {
        item: ItemId,
    },

    // -- Ingredients --
    FillingPlaced {
        slot: u8,
        filling: FillingId,
    },
    FillingDiscarded {
        filling: FillingId,
    },

    // -- Batter & frying --
    BatterStageChanged {
        stage: u8,
    },
    /// Frying started or resumed.
    FryingStarted,
    /// The item was lifted out of the oil.
    FryingPaused,
    FryingColorChanged {
        color: FryingColor,
    },

    // -- Toppings --
    SugarApplied,
    SugarDenied,
    SauceSelected {
        sauce: SauceKind,
    },
    SauceGaugeChanged {
        sauce: SauceKind,
        remaining: f32,
    },
    SauceDepleted {
        sauce: SauceKind,
    },

    // -- Host configuration --
    ZoneMissing {
        station: Station,
    },
}

/// Discriminant tag for event types, used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SessionStarted,
    SessionFinished,
    SessionAbandoned,
    PhaseChanged,
    ItemCreated,
    ItemPlaced,
    ItemReverted,
    ItemDiscarded,
    FillingPlaced,
    FillingDiscarded,
    BatterStageChanged,
    FryingStarted,
    FryingPaused,
    FryingColorChanged,
    SugarApplied,
    SugarDenied,
    SauceSelected,
    SauceGaugeChanged,
    SauceDepleted,
    ZoneMissing,
}

const EVENT_KIND_COUNT: usize = 20;

impl CookingEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CookingEvent::SessionStarted { .. } => EventKind::SessionStarted,
            CookingEvent::SessionFinished { .. } => EventKind::SessionFinished,
            CookingEvent::SessionAbandoned => EventKind::SessionAbandoned,
            CookingEvent::PhaseChanged { .. } => EventKind::PhaseChanged,
            CookingEvent::ItemCreated { .. } => EventKind::ItemCreated,
            CookingEvent::ItemPlaced { .. } => EventKind::ItemPlaced,
            CookingEvent::ItemReverted { .. } => EventKind::ItemReverted,
            CookingEvent::ItemDiscarded { .. } => EventKind::ItemDiscarded,
            CookingEvent::FillingPlaced { .. } => EventKind::FillingPlaced,
            CookingEvent::FillingDiscarded { .. } => EventKind::FillingDiscarded,
            CookingEvent::BatterStageChanged { .. } => EventKind::BatterStageChanged,
            CookingEvent::FryingStarted => EventKind::FryingStarted,
            CookingEvent::FryingPaused => EventKind::FryingPaused,
            CookingEvent::FryingColorChanged { .. } => EventKind::FryingColorChanged,
            CookingEvent::SugarApplied => EventKind::SugarApplied,
            CookingEvent::SugarDenied => EventKind::SugarDenied,
            CookingEvent::SauceSelected { .. } => EventKind::SauceSelected,
            CookingEvent::SauceGaugeChanged { .. } => EventKind::SauceGaugeChanged,
            CookingEvent::SauceDepleted { .. } => EventKind::SauceDepleted,
            CookingEvent::ZoneMissing { .. } => EventKind::ZoneMissing,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer of sequenced events. When full, the oldest
/// event is dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<(u64, CookingEvent)>>,
    head: usize,
    len: usize,
    total_written: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event tagged with its global sequence number.
    pub fn push(&mut self, seq: u64, event: CookingEvent) {
        self.events[self.head] = Some((seq, event));
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Iterate over buffered events, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CookingEvent> {
        self.iter_sequenced().map(|(_, e)| e)
    }

    fn iter_sequenced(&self) -> impl Iterator<Item = &(u64, CookingEvent)> {
        // Once full, head points at the oldest entry.
        let start = if self.len < self.capacity() { 0 } else { self.head };
        let cap = self.capacity();
        (0..self.len).filter_map(move |i| self.events[(start + i) % cap].as_ref())
    }

    /// Move all buffered events out, oldest first.
    fn drain_into(&mut self, out: &mut Vec<(u64, CookingEvent)>) {
        out.extend(self.iter_sequenced().cloned());
        self.clear();
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// A listener receives delivered events read-only.
pub type EventListener = Box<dyn FnMut(&CookingEvent)>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&CookingEvent) -> bool>;

/// Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriberPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct SubscriberEntry {
    listener: EventListener,
    filter: Option<EventFilter>,
    priority: SubscriberPriority,
    insertion_order: u64,
}

impl SubscriberEntry {
    fn sort_key(&self) -> (SubscriberPriority, u64) {
        (self.priority, self.insertion_order)
    }

    fn call(&mut self, event: &CookingEvent) {
        if let Some(ref filter) = self.filter
            && !filter(event)
        {
            return;
        }
        (self.listener)(event);
    }
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("priority", &self.priority)
            .field("filtered", &self.filter.is_some())
            .field("insertion_order", &self.insertion_order)
            .finish()
    }
}

/// Insert keeping the list sorted by `(priority, insertion_order)`.
fn insert_sorted(list: &mut Vec<SubscriberEntry>, entry: SubscriberEntry) {
    let key = entry.sort_key();
    let pos = list.partition_point(|e| e.sort_key() <= key);
    list.insert(pos, entry);
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One ring buffer per event kind, subscriber lists, and suppression flags.
#[derive(Debug)]
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: [Vec<SubscriberEntry>; EVENT_KIND_COUNT],
    catch_all: Vec<SubscriberEntry>,
    default_capacity: usize,
    next_seq: u64,
    next_insertion_order: u64,
    delivered: u64,
}

impl EventBus {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: std::array::from_fn(|_| Vec::new()),
            catch_all: Vec::new(),
            default_capacity,
            next_seq: 0,
            next_insertion_order: 0,
            delivered: 0,
        }
    }

    /// Suppress an event kind and drop anything already buffered for it.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. No-op if its kind is suppressed.
    pub fn emit(&mut self, event: CookingEvent) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(seq, event);
    }

    /// Listen to one kind with normal priority and no filter.
    pub fn subscribe(&mut self, kind: EventKind, listener: EventListener) {
        self.subscribe_filtered(kind, SubscriberPriority::Normal, None, listener);
    }

    pub fn subscribe_filtered(
        &mut self,
        kind: EventKind,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: EventListener,
    ) {
        let entry = self.entry(priority, filter, listener);
        insert_sorted(&mut self.subscribers[kind.index()], entry);
    }

    /// Listen to every kind with normal priority and no filter.
    pub fn subscribe_all(&mut self, listener: EventListener) {
        self.subscribe_all_filtered(SubscriberPriority::Normal, None, listener);
    }

    pub fn subscribe_all_filtered(
        &mut self,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: EventListener,
    ) {
        let entry = self.entry(priority, filter, listener);
        insert_sorted(&mut self.catch_all, entry);
    }

    fn entry(
        &mut self,
        priority: SubscriberPriority,
        filter: Option<EventFilter>,
        listener: EventListener,
    ) -> SubscriberEntry {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        SubscriberEntry {
            listener,
            filter,
            priority,
            insertion_order: order,
        }
    }

    /// Deliver all buffered events in emission order, then clear the buffers.
    ///
    /// For each event, per-kind and catch-all listeners are merged by
    /// `(priority, registration order)`.
    pub fn deliver(&mut self) {
        let mut pending = Vec::new();
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.drain_into(&mut pending);
        }
        if pending.is_empty() {
            return;
        }
        pending.sort_by_key(|(seq, _)| *seq);

        for (_, event) in &pending {
            let kind_subs = &mut self.subscribers[event.kind().index()];
            let mut a = kind_subs.iter_mut().peekable();
            let mut b = self.catch_all.iter_mut().peekable();
            loop {
                let take_kind = match (a.peek(), b.peek()) {
                    (Some(x), Some(y)) => x.sort_key() <= y.sort_key(),
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => break,
                };
                let next = if take_kind { a.next() } else { b.next() };
                if let Some(entry) = next {
                    entry.call(event);
                }
            }
        }
        self.delivered += pending.len() as u64;
    }

    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Events of `kind` waiting for delivery.
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.len())
            .unwrap_or(0)
    }

    /// Events of `kind` ever emitted (including dropped).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }

    /// Events handed to listeners so far.
    pub fn total_delivered(&self) -> u64 {
        self.delivered
    }

    /// Clear all buffers. Subscribers and suppression settings are kept.
    pub fn clear_all(&mut self) {
        for b in self.buffers.iter_mut().flatten() {
            b.clear();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
