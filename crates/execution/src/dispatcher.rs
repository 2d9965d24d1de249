//! Slice Dispatcher
//!
//! A single logical dispatcher shared by all orders. Pending slices sit
//! in one earliest-due-first priority queue; when a slice comes due it is
//! marked DISPATCHED and its venue submission is spawned as its own task,
//! so one slow venue call never delays the dispatch timing of unrelated
//! slices. Completed venue fills are applied to the parent order.
//!
//! Queue ordering and sleeping use the tokio clock captured at enqueue
//! time; the wall-clock `scheduled_dispatch_time` on each slice is kept
//! for the record only. This makes dispatch deterministic under paused
//! test time and immune to wall-clock jumps.

use atlas_core::{ChildSlice, EngineEvent, Order, OrderId, OrderStatus, SliceId, SliceState};
use atlas_order_manager::OrderLifecycleManager;
use atlas_ports::{Clock, EventPublisher, ExecutionRequest, ExecutionVenue};
use dashmap::DashMap;
use log::{debug, info, warn};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::models::SlicePlan;

/// Shared time-ordered dispatcher for child slices
///
/// Cheap to clone; all clones share the same queue and slice registry.
#[derive(Clone)]
pub struct SliceDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    /// Pending slices across all orders, earliest due first
    queue: Mutex<PriorityQueue<SliceId, Reverse<Instant>>>,
    /// All slices ever scheduled, keyed by slice id
    slices: DashMap<SliceId, ChildSlice>,
    /// Woken when an earlier slice arrives or the queue refills
    notify: Notify,
    lifecycle: Arc<OrderLifecycleManager>,
    venue: Arc<dyn ExecutionVenue>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SliceDispatcher {
    pub fn new(
        lifecycle: Arc<OrderLifecycleManager>,
        venue: Arc<dyn ExecutionVenue>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(PriorityQueue::new()),
                slices: DashMap::new(),
                notify: Notify::new(),
                lifecycle,
                venue,
                events,
                clock,
            }),
        }
    }

    /// Spawn the dispatch loop
    pub fn start(&self) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.run().await })
    }

    /// Enqueue a decomposed schedule for an order
    ///
    /// Stores each planned slice as PENDING with its scheduled dispatch
    /// time and returns the slice ids in schedule order for registration
    /// on the parent.
    pub fn schedule(&self, order: &Order, plans: &[SlicePlan]) -> Vec<SliceId> {
        let now_wall = self.inner.clock.now();
        let now_instant = Instant::now();
        let mut ids = Vec::with_capacity(plans.len());

        {
            let mut queue = self.inner.queue.lock().expect("dispatch queue poisoned");
            for plan in plans {
                let scheduled_at = now_wall + plan.time_offset;
                let slice =
                    ChildSlice::new(order.id, plan.sequence, plan.quantity, scheduled_at);
                let due = now_instant + plan.time_offset.to_std().unwrap_or_default();

                ids.push(slice.id);
                queue.push(slice.id, Reverse(due));
                self.inner.slices.insert(slice.id, slice);
            }
        }

        info!(
            "Scheduled {} slices for order {} ({} total pending)",
            plans.len(),
            order.id,
            self.pending_count()
        );
        self.inner.notify.notify_one();
        ids
    }

    /// Remove an order's PENDING slices from the queue
    ///
    /// Called during cancellation, before the cancel call returns.
    /// Idempotent: slices already DISPATCHED are left untouched and will
    /// complete normally.
    pub fn drop_pending(&self, order_id: &OrderId) -> usize {
        let slice_ids: Vec<SliceId> = self
            .inner
            .slices
            .iter()
            .filter(|entry| entry.parent_order_id == *order_id)
            .map(|entry| entry.id)
            .collect();

        let mut skipped = 0;
        {
            let mut queue = self.inner.queue.lock().expect("dispatch queue poisoned");
            for slice_id in &slice_ids {
                if queue.remove(slice_id).is_some() {
                    if let Some(mut slice) = self.inner.slices.get_mut(slice_id) {
                        slice.state = SliceState::Skipped;
                    }
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            info!("Skipped {} pending slices of order {}", skipped, order_id);
        }
        skipped
    }

    /// Look up a slice by id
    pub fn slice(&self, slice_id: &SliceId) -> Option<ChildSlice> {
        self.inner.slices.get(slice_id).map(|s| s.clone())
    }

    /// All slices of an order, in schedule order
    pub fn slices_for(&self, order_id: &OrderId) -> Vec<ChildSlice> {
        let mut slices: Vec<ChildSlice> = self
            .inner
            .slices
            .iter()
            .filter(|entry| entry.parent_order_id == *order_id)
            .map(|entry| entry.clone())
            .collect();
        slices.sort_by_key(|s| s.sequence);
        slices
    }

    /// Number of slices currently waiting in the queue
    pub fn pending_count(&self) -> usize {
        self.inner.queue.lock().expect("dispatch queue poisoned").len()
    }

    async fn run(&self) {
        debug!("Slice dispatcher started");
        loop {
            let next_due = {
                let queue = self.inner.queue.lock().expect("dispatch queue poisoned");
                queue.peek().map(|(_, Reverse(due))| *due)
            };

            match next_due {
                None => self.inner.notify.notified().await,
                Some(due) => {
                    if Instant::now() < due {
                        tokio::select! {
                            _ = tokio::time::sleep_until(due) => {}
                            // An earlier slice may have arrived; re-peek
                            _ = self.inner.notify.notified() => continue,
                        }
                    }
                    self.dispatch_due();
                }
            }
        }
    }

    /// Pop every slice that has come due and launch its venue submission
    fn dispatch_due(&self) {
        let now = Instant::now();
        loop {
            let slice_id = {
                let mut queue = self.inner.queue.lock().expect("dispatch queue poisoned");
                match queue.peek() {
                    Some((_, Reverse(due))) if *due <= now => queue.pop().map(|(id, _)| id),
                    _ => None,
                }
            };

            let Some(slice_id) = slice_id else { break };
            self.dispatch_one(slice_id);
        }
    }

    /// Transition one slice to DISPATCHED and submit it to the venue
    ///
    /// The submission runs in its own task: dispatch itself is a short,
    /// non-blocking enqueue. Once dispatched a slice always completes;
    /// venue failures are logged and never retried.
    fn dispatch_one(&self, slice_id: SliceId) {
        let Some(slice) = self.inner.slices.get_mut(&slice_id).map(|mut s| {
            s.state = SliceState::Dispatched;
            s.clone()
        }) else {
            return;
        };

        let parent = match self.inner.lifecycle.order(&slice.parent_order_id) {
            Ok(order) => order,
            Err(err) => {
                warn!("Dropping slice {}: {}", slice_id, err);
                return;
            }
        };

        debug!(
            "Dispatching slice {}/{} of order {}: qty={}",
            slice.sequence + 1,
            parent.child_slice_ids.len(),
            parent.id,
            slice.quantity
        );

        let request = ExecutionRequest {
            order_id: parent.id,
            slice_id: Some(slice_id),
            symbol: parent.symbol.clone(),
            side: parent.side,
            quantity: slice.quantity,
            limit_price: parent.price,
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.venue.submit(request).await {
                Ok(fill) => {
                    match inner
                        .lifecycle
                        .apply_fill(&slice.parent_order_id, fill.quantity, fill.price)
                    {
                        Ok(status) => {
                            let order = inner.lifecycle.order(&slice.parent_order_id);
                            let cumulative = order
                                .map(|o| o.filled_quantity)
                                .unwrap_or(fill.quantity);
                            inner
                                .events
                                .publish(EngineEvent::OrderFilled {
                                    order_id: slice.parent_order_id,
                                    fill_quantity: fill.quantity,
                                    fill_price: fill.price,
                                    cumulative_quantity: cumulative,
                                    fully_filled: status == OrderStatus::Filled,
                                    timestamp: inner.clock.now(),
                                })
                                .await;
                        }
                        Err(err) => {
                            warn!(
                                "Fill for slice {} of order {} not applied: {}",
                                slice_id, slice.parent_order_id, err
                            );
                        }
                    }
                }
                Err(err) => {
                    // Never retried; the slice stays DISPATCHED with no fill
                    warn!(
                        "Venue failed for slice {} of order {}: {}",
                        slice_id, slice.parent_order_id, err
                    );
                }
            }
        });
    }
}
