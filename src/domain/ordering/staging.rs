//! Transient staging area between checkout submission and payment.
//!
//! A card checkout cannot create the order until the payment provider says
//! the money moved, which arrives later on a different request. The draft
//! waits here, keyed by cart session.
//!
//! ```text
//!   submit ──stage──▶ ┌──────────────┐ ◀──confirm── payment webhook
//!                     │ session slot │ ──▶ OrderPipeline::process
//!   sweeper ──evict─▶ └──────────────┘
//! ```
//!
//! # Concurrency
//!
//! Each session owns a slot behind its own async mutex. `confirm` holds
//! the slot for the whole pipeline run, so two confirmations for one
//! session never both run the pipeline. A slot is retired (and removed from
//! the map) once its draft is gone; `stage` retries on a retired slot.
//! `stage_and_confirm` keeps one guard across both steps.
//!
//! Lock order is slot then map. The sweeper holds the map lock but only
//! `try_lock`s slots, skipping any that are busy.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

use crate::domain::foundation::CartSessionId;
use crate::ports::{OrderPipeline, OrderReceipt};

use super::draft::DraftOrder;
use super::errors::OrderError;

/// How long an unconfirmed draft survives.
pub const DEFAULT_DRAFT_TTL: Duration = Duration::from_secs(30 * 60);

/// Period of the abandonment sweep.
pub const DEFAULT_DRAFT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A draft plus the moment it was staged.
#[derive(Debug, Clone)]
pub struct StagedDraft {
    pub draft: DraftOrder,
    pub staged_at: Instant,
}

/// Result of a confirmation attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// The pipeline ran and the draft was evicted.
    Created(OrderReceipt),
    /// Nothing was staged for the session (already confirmed, swept, or
    /// never staged). Nothing ran.
    NothingStaged,
}

#[derive(Default)]
struct Slot {
    draft: Option<StagedDraft>,
    retired: bool,
}

type SlotRef = Arc<Mutex<Slot>>;

/// Concurrent map of session → staged draft.
pub struct OrderStagingCache {
    slots: RwLock<HashMap<CartSessionId, SlotRef>>,
    pipeline: Arc<dyn OrderPipeline>,
    ttl: Duration,
}

impl OrderStagingCache {
    pub fn new(pipeline: Arc<dyn OrderPipeline>, ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            pipeline,
            ttl,
        }
    }

    /// Store a draft for the session, replacing any earlier one.
    pub async fn stage(&self, session_id: &CartSessionId, draft: DraftOrder) {
        let (_, mut slot) = self.live_slot(session_id).await;
        Self::replace(session_id, &mut slot, draft);
    }

    /// Stage a draft and run the pipeline on it without releasing the slot.
    ///
    /// Used for orders that need no payment confirmation: no concurrent
    /// `stage` can swap the draft between staging and processing. On
    /// pipeline failure the draft stays staged, as with [`Self::confirm`].
    pub async fn stage_and_confirm(
        &self,
        session_id: &CartSessionId,
        draft: DraftOrder,
    ) -> Result<OrderReceipt, OrderError> {
        let (slot_ref, mut slot) = self.live_slot(session_id).await;
        let staged = Self::replace(session_id, &mut slot, draft);

        let receipt = self.run_pipeline(session_id, &staged.draft).await?;
        self.retire(session_id, &slot_ref, &mut slot, &receipt).await;
        Ok(receipt)
    }

    /// Turn the staged draft into an order.
    ///
    /// On pipeline failure the draft stays staged and the error is returned,
    /// so the confirmation can be retried.
    pub async fn confirm(&self, session_id: &CartSessionId) -> Result<Confirmation, OrderError> {
        let Some(slot_ref) = self.slot(session_id).await else {
            tracing::debug!(session_id = %session_id, "Confirm with nothing staged");
            return Ok(Confirmation::NothingStaged);
        };

        let mut slot = slot_ref.lock().await;
        let Some(staged) = slot.draft.as_ref() else {
            tracing::debug!(session_id = %session_id, "Confirm with nothing staged");
            return Ok(Confirmation::NothingStaged);
        };

        let receipt = self.run_pipeline(session_id, &staged.draft).await?;
        self.retire(session_id, &slot_ref, &mut slot, &receipt).await;
        Ok(Confirmation::Created(receipt))
    }

    async fn run_pipeline(
        &self,
        session_id: &CartSessionId,
        draft: &DraftOrder,
    ) -> Result<OrderReceipt, OrderError> {
        self.pipeline
            .process(session_id, draft)
            .await
            .map_err(|e| {
                tracing::warn!(session_id = %session_id, error = %e, "Order pipeline failed, draft kept");
                e
            })
    }

    /// Evict a processed draft and drop its slot from the map.
    async fn retire(
        &self,
        session_id: &CartSessionId,
        slot_ref: &SlotRef,
        slot: &mut Slot,
        receipt: &OrderReceipt,
    ) {
        slot.draft = None;
        slot.retired = true;
        self.remove_slot(session_id, slot_ref).await;

        tracing::info!(
            session_id = %session_id,
            order_id = %receipt.order_id,
            "Staged order confirmed"
        );
    }

    /// Evict drafts older than the TTL. Returns how many were evicted.
    ///
    /// Slots locked by an in-flight confirmation are left alone.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        let mut slots = self.slots.write().await;

        slots.retain(|_, slot| {
            let Ok(mut slot) = slot.try_lock() else {
                return true;
            };
            let expired = match &slot.draft {
                Some(staged) => now.duration_since(staged.staged_at) > self.ttl,
                None => true,
            };
            if expired {
                if slot.draft.take().is_some() {
                    evicted += 1;
                }
                slot.retired = true;
            }
            !expired
        });

        evicted
    }

    /// Sweep every `interval` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run_sweeper(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        tracing::info!(
            interval_secs = interval.as_secs(),
            ttl_secs = self.ttl.as_secs(),
            "Draft sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.sweep().await;
                    if evicted > 0 {
                        tracing::info!(evicted, "Abandoned draft orders evicted");
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        tracing::info!("Draft sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Number of staged drafts.
    pub async fn draft_count(&self) -> usize {
        let slots: Vec<SlotRef> = self.slots.read().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.draft.is_some() {
                count += 1;
            }
        }
        count
    }

    /// Copy of the draft staged for a session.
    pub async fn get(&self, session_id: &CartSessionId) -> Option<StagedDraft> {
        let slot = self.slot(session_id).await?;
        let slot = slot.lock().await;
        slot.draft.clone()
    }

    /// Lock the session's slot, creating it if needed. Retired slots are
    /// skipped; the next map lookup finds or creates a fresh one.
    async fn live_slot(&self, session_id: &CartSessionId) -> (SlotRef, OwnedMutexGuard<Slot>) {
        loop {
            let slot_ref = {
                let mut slots = self.slots.write().await;
                slots.entry(session_id.clone()).or_default().clone()
            };

            let slot = slot_ref.clone().lock_owned().await;
            if !slot.retired {
                return (slot_ref, slot);
            }
        }
    }

    fn replace<'a>(
        session_id: &CartSessionId,
        slot: &'a mut Slot,
        draft: DraftOrder,
    ) -> &'a StagedDraft {
        let replaced = slot.draft.is_some();
        tracing::debug!(session_id = %session_id, replaced, "Draft order staged");
        slot.draft.insert(StagedDraft {
            draft,
            staged_at: Instant::now(),
        })
    }

    async fn slot(&self, session_id: &CartSessionId) -> Option<SlotRef> {
        self.slots.read().await.get(session_id).cloned()
    }

    async fn remove_slot(&self, session_id: &CartSessionId, slot: &SlotRef) {
        let mut slots = self.slots.write().await;
        if slots
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            slots.remove(session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CustomerId, DomainError, OrderId, Timestamp};
    use crate::domain::ordering::{ContactInfo, LineItem, PaymentMethod};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        calls: AtomicUsize,
        methods: std::sync::Mutex<Vec<PaymentMethod>>,
        fail: AtomicBool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl OrderPipeline for CountingPipeline {
        async fn process(
            &self,
            _session_id: &CartSessionId,
            draft: &DraftOrder,
        ) -> Result<OrderReceipt, OrderError> {
            self.methods.lock().unwrap().push(draft.method);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(OrderError::OrderPersist(DomainError::database("unavailable")));
            }
            Ok(OrderReceipt {
                order_id: OrderId::new(),
                customer_id: CustomerId::new(),
                total_cents: draft.total_cents(),
                created_at: Timestamp::now(),
            })
        }
    }

    fn draft(quantity: u32) -> DraftOrder {
        DraftOrder {
            contact: ContactInfo {
                fullname: "Ada Baker".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: String::new(),
            },
            pickup_time: Timestamp::now().plus_minutes(60),
            method: PaymentMethod::Card,
            items: vec![LineItem {
                product_id: "baguette".to_string(),
                name: "Baguette".to_string(),
                unit_price_cents: 300,
                quantity,
            }],
        }
    }

    fn session(s: &str) -> CartSessionId {
        CartSessionId::new(s).unwrap()
    }

    fn cache(pipeline: Arc<CountingPipeline>) -> OrderStagingCache {
        OrderStagingCache::new(pipeline, DEFAULT_DRAFT_TTL)
    }

    #[tokio::test]
    async fn stage_overwrites_previous_draft() {
        let cache = cache(Arc::new(CountingPipeline::default()));
        let s = session("s1");

        cache.stage(&s, draft(1)).await;
        cache.stage(&s, draft(3)).await;

        assert_eq!(cache.draft_count().await, 1);
        assert_eq!(cache.get(&s).await.unwrap().draft.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn confirm_runs_pipeline_and_evicts() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = cache(pipeline.clone());
        let s = session("s1");
        cache.stage(&s, draft(2)).await;

        let result = cache.confirm(&s).await.unwrap();

        match result {
            Confirmation::Created(receipt) => assert_eq!(receipt.total_cents, 600),
            other => panic!("expected Created, got {:?}", other),
        }
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
        assert!(cache.get(&s).await.is_none());
        assert_eq!(cache.draft_count().await, 0);
    }

    #[tokio::test]
    async fn confirm_without_draft_is_noop() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = cache(pipeline.clone());

        let result = cache.confirm(&session("never-staged")).await.unwrap();

        assert_eq!(result, Confirmation::NothingStaged);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_confirm_is_noop() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = cache(pipeline.clone());
        let s = session("s1");
        cache.stage(&s, draft(1)).await;

        cache.confirm(&s).await.unwrap();
        let second = cache.confirm(&s).await.unwrap();

        assert_eq!(second, Confirmation::NothingStaged);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_pipeline_keeps_draft_for_retry() {
        let pipeline = Arc::new(CountingPipeline::default());
        pipeline.fail.store(true, Ordering::SeqCst);
        let cache = cache(pipeline.clone());
        let s = session("s1");
        cache.stage(&s, draft(1)).await;

        let err = cache.confirm(&s).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderPersist(_)));
        assert!(cache.get(&s).await.is_some());

        pipeline.fail.store(false, Ordering::SeqCst);
        assert!(matches!(
            cache.confirm(&s).await.unwrap(),
            Confirmation::Created(_)
        ));
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_confirms_run_pipeline_once() {
        let pipeline = Arc::new(CountingPipeline {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let cache = Arc::new(cache(pipeline.clone()));
        let s = session("s1");
        cache.stage(&s, draft(1)).await;

        let a = {
            let cache = cache.clone();
            let s = s.clone();
            tokio::spawn(async move { cache.confirm(&s).await })
        };
        let b = {
            let cache = cache.clone();
            let s = s.clone();
            tokio::spawn(async move { cache.confirm(&s).await })
        };

        let results = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let created = results
            .iter()
            .filter(|r| matches!(r, Confirmation::Created(_)))
            .count();

        assert_eq!(created, 1);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
    }

    fn cash_draft(quantity: u32) -> DraftOrder {
        DraftOrder {
            method: PaymentMethod::Cash,
            ..draft(quantity)
        }
    }

    #[tokio::test]
    async fn stage_and_confirm_creates_order_and_evicts() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = cache(pipeline.clone());
        let s = session("s1");

        let receipt = cache.stage_and_confirm(&s, cash_draft(2)).await.unwrap();

        assert_eq!(receipt.total_cents, 600);
        assert!(cache.get(&s).await.is_none());
        assert_eq!(cache.confirm(&s).await.unwrap(), Confirmation::NothingStaged);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stage_and_confirm_failure_keeps_draft() {
        let pipeline = Arc::new(CountingPipeline::default());
        pipeline.fail.store(true, Ordering::SeqCst);
        let cache = cache(pipeline.clone());
        let s = session("s1");

        let err = cache.stage_and_confirm(&s, cash_draft(1)).await.unwrap_err();

        assert!(matches!(err, OrderError::OrderPersist(_)));
        assert_eq!(cache.get(&s).await.unwrap().draft.method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn card_stage_cannot_swap_draft_under_cash_confirm() {
        let pipeline = Arc::new(CountingPipeline {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let cache = Arc::new(cache(pipeline.clone()));
        let s = session("s1");

        let cash = {
            let cache = cache.clone();
            let s = s.clone();
            tokio::spawn(async move { cache.stage_and_confirm(&s, cash_draft(1)).await })
        };
        // Wait until the cash path is inside the pipeline.
        while pipeline.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        cache.stage(&s, draft(9)).await;

        let receipt = cash.await.unwrap().unwrap();
        assert_eq!(receipt.total_cents, 300);
        assert_eq!(*pipeline.methods.lock().unwrap(), vec![PaymentMethod::Cash]);

        // The card draft waited for the slot and is staged on its own.
        let staged = cache.get(&s).await.unwrap();
        assert_eq!(staged.draft.method, PaymentMethod::Card);
        assert_eq!(staged.draft.items[0].quantity, 9);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_evicts_only_expired_drafts() {
        let cache = OrderStagingCache::new(
            Arc::new(CountingPipeline::default()),
            Duration::from_secs(60),
        );
        cache.stage(&session("old"), draft(1)).await;
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.stage(&session("fresh"), draft(1)).await;
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.sweep().await, 1);
        assert!(cache.get(&session("old")).await.is_none());
        assert!(cache.get(&session("fresh")).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn draft_exactly_at_ttl_is_kept() {
        let cache = OrderStagingCache::new(
            Arc::new(CountingPipeline::default()),
            Duration::from_secs(60),
        );
        cache.stage(&session("s1"), draft(1)).await;
        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(cache.sweep().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_after_sweep_is_noop() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = OrderStagingCache::new(pipeline.clone(), Duration::from_secs(60));
        let s = session("s1");
        cache.stage(&s, draft(1)).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.sweep().await;

        assert_eq!(cache.confirm(&s).await.unwrap(), Confirmation::NothingStaged);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stage_after_confirm_starts_fresh() {
        let pipeline = Arc::new(CountingPipeline::default());
        let cache = cache(pipeline.clone());
        let s = session("s1");
        cache.stage(&s, draft(1)).await;
        cache.confirm(&s).await.unwrap();

        cache.stage(&s, draft(5)).await;

        assert_eq!(cache.get(&s).await.unwrap().draft.items[0].quantity, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_stops_on_shutdown() {
        let cache = Arc::new(OrderStagingCache::new(
            Arc::new(CountingPipeline::default()),
            Duration::from_secs(60),
        ));
        let (tx, rx) = watch::channel(false);
        let handle = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.run_sweeper(Duration::from_secs(10), rx).await })
        };

        cache.stage(&session("s1"), draft(1)).await;
        tokio::time::sleep(Duration::from_secs(75)).await;
        assert_eq!(cache.draft_count().await, 0);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
