//! Typed notification system with pre-allocated ring buffers.
//!
//! Events are recorded while the grid mutates and while a tick runs, then
//! delivered in batch after the tick completes. Listeners therefore never
//! observe a half-finished tick, and a listener that wants to mutate the
//! grid must go through the command queue like any other caller -- there is
//! no re-entrancy path.
//!
//! Each event kind has its own [`EventBuffer`] ring buffer with a
//! configurable capacity; when a buffer is full the oldest events are
//! dropped. Event kinds can be suppressed via [`EventBus::suppress`], which
//! prevents any allocation or recording for that kind.

use crate::component::ComponentKind;
use crate::geometry::{Bounds, GridPosition};
use crate::time::Ticks;
use slotmap::{SlotMap, new_key_type};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation notification. Each carries the minimal data a presentation
/// layer needs to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A component was attached to a cell.
    ComponentPlaced {
        position: GridPosition,
        kind: ComponentKind,
    },
    /// A component was detached from a cell (removal, eviction, or clear).
    ComponentRemoved {
        position: GridPosition,
        kind: ComponentKind,
    },
    /// The grid's bounds changed. `old` is `None` when the grid was
    /// previously unbounded.
    GridResized { old: Option<Bounds>, new: Bounds },
    /// Every component was removed from the grid.
    GridCleared { removed: usize },
    /// A cell was queued for the next propagation pass.
    CellMarked { position: GridPosition },
    /// A full simulation tick finished.
    TickCompleted { tick: Ticks },
}

/// Discriminant tag for event types, used for suppression and subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ComponentPlaced,
    ComponentRemoved,
    GridResized,
    GridCleared,
    CellMarked,
    TickCompleted,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 6;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ComponentPlaced { .. } => EventKind::ComponentPlaced,
            Event::ComponentRemoved { .. } => EventKind::ComponentRemoved,
            Event::GridResized { .. } => EventKind::GridResized,
            Event::GridCleared { .. } => EventKind::GridCleared,
            Event::CellMarked { .. } => EventKind::CellMarked,
            Event::TickCompleted { .. } => EventKind::TickCompleted,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored (may be less than capacity).
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
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

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
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

    /// Number of events dropped because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> EventBufferIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points to the next write position, which is the oldest entry
            self.head
        };
        EventBufferIter {
            buffer: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Clear all events from the buffer.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over events in an [`EventBuffer`], from oldest to newest.
pub struct EventBufferIter<'a> {
    buffer: &'a EventBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for EventBufferIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.buffer.events[self.index].as_ref();
        self.index = (self.index + 1) % self.buffer.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventBufferIter<'_> {}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// A listener receives events read-only during delivery.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Priority level for event listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

new_key_type! {
    /// Stable handle for a registered listener, usable to unsubscribe.
    pub struct SubscriberId;
}

struct SubscriberEntry {
    listener: Listener,
    priority: ListenerPriority,
    insertion_order: u64,
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("listener", &"<fn>")
            .field("priority", &self.priority)
            .field("insertion_order", &self.insertion_order)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The central notification bus. Holds one ring buffer per event kind,
/// listener maps, and suppression flags.
pub struct EventBus {
    /// One ring buffer per event kind, allocated lazily on first emit.
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],

    /// Suppressed event kinds. Suppressed events are never buffered.
    suppressed: [bool; EVENT_KIND_COUNT],

    /// Listeners keyed by stable handle, per event kind.
    subscribers: [SlotMap<SubscriberId, SubscriberEntry>; EVENT_KIND_COUNT],

    /// Default buffer capacity for new event buffers.
    default_capacity: usize,

    /// Monotonically increasing counter for stable delivery ordering.
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a new event bus with the given default buffer capacity per kind.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: std::array::from_fn(|_| SlotMap::with_key()),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppress an event kind. Suppressed events are never allocated or
    /// buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    /// Check if an event kind is suppressed.
    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event. No-op if the event kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a listener with Normal priority. Returns a handle for
    /// [`unsubscribe`](EventBus::unsubscribe).
    pub fn on(&mut self, kind: EventKind, listener: Listener) -> SubscriberId {
        self.on_with_priority(kind, ListenerPriority::Normal, listener)
    }

    /// Register a listener with an explicit priority.
    pub fn on_with_priority(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        listener: Listener,
    ) -> SubscriberId {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.subscribers[kind.index()].insert(SubscriberEntry {
            listener,
            priority,
            insertion_order: order,
        })
    }

    /// Remove a listener. Returns true if the handle was still registered.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriberId) -> bool {
        self.subscribers[kind.index()].remove(id).is_some()
    }

    /// Deliver all buffered events to listeners, oldest first, in
    /// `(priority, registration order)`. Buffers are cleared afterwards.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            if self.suppressed[idx] {
                continue;
            }
            let Some(buffer) = self.buffers[idx].as_ref() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            // Collect events into a temporary Vec to avoid borrow conflicts
            // between the buffer and the listeners.
            let events: Vec<Event> = buffer.iter().cloned().collect();

            let mut order: Vec<(SubscriberId, ListenerPriority, u64)> = self.subscribers[idx]
                .iter()
                .map(|(id, entry)| (id, entry.priority, entry.insertion_order))
                .collect();
            order.sort_by_key(|&(_, priority, insertion)| (priority as u8, insertion));

            for (id, _, _) in order {
                // A listener may have been unsubscribed by an earlier one.
                let Some(entry) = self.subscribers[idx].get_mut(id) else {
                    continue;
                };
                for event in &events {
                    (entry.listener)(event);
                }
            }

            if let Some(buffer) = self.buffers[idx].as_mut() {
                buffer.clear();
            }
        }
    }

    /// Get the event buffer for a specific event kind (read-only).
    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    /// Count of events currently buffered for a kind.
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.len())
            .unwrap_or(0)
    }

    /// Total events ever emitted for a kind (including dropped).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map(|b| b.total_written())
            .unwrap_or(0)
    }

    /// Clear all buffers. Does not remove listeners or suppression flags.
    pub fn clear_all(&mut self) {
        for buffer in self.buffers.iter_mut().flatten() {
            buffer.clear();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
