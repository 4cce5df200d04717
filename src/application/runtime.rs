//! Live service wiring.
//!
//! [`LiveServices`] owns every long-lived piece of the real-time core: the
//! hub actor, the token issuer and the staging cache, plus the background
//! loops that keep them tidy. Nothing here is global; dropping the services
//! after [`LiveServices::shutdown`] releases everything.
//!
//! ```text
//!   LiveServices::start
//!     ├── Hub::run              (actor, owns the client registry)
//!     ├── TokenIssuer sweeper   (every token_sweep_interval)
//!     └── OrderStagingCache sweeper (every orders.sweep_interval)
//!              all stopped by one watch::Sender<bool>
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapters::auth::StaticKeyAuthenticator;
use crate::adapters::memory::{
    InMemoryCartStore, InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryVisitArchive,
};
use crate::adapters::notification::TracingOrderNotifier;
use crate::adapters::payment::ForwardedPaymentEvents;
use crate::adapters::websocket::{ConnectionSettings, EventRouter, Hub, HubHandle};
use crate::config::AppConfig;
use crate::domain::analytics::VisitAggregator;
use crate::domain::auth::TokenIssuer;
use crate::domain::ordering::OrderStagingCache;
use crate::ports::{
    AdminAuthenticator, CartStore, CustomerRepository, LiveUpdates, OrderNotifier,
    OrderRepository, PaymentEventVerifier, VisitArchive,
};

use super::handlers::OrderCreationPipeline;

/// Port implementations the live core is built from.
#[derive(Clone)]
pub struct LiveDependencies {
    pub visit_archive: Arc<dyn VisitArchive>,
    pub customers: Arc<dyn CustomerRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub carts: Arc<dyn CartStore>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub payments: Arc<dyn PaymentEventVerifier>,
    pub admin_auth: Arc<dyn AdminAuthenticator>,
}

impl LiveDependencies {
    /// In-memory stores with the configured admin key and forwarding secret.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self {
            visit_archive: Arc::new(InMemoryVisitArchive::new()),
            customers: Arc::new(InMemoryCustomerRepository::new()),
            orders: Arc::new(InMemoryOrderRepository::new()),
            carts: Arc::new(InMemoryCartStore::new()),
            notifier: Arc::new(TracingOrderNotifier),
            payments: Arc::new(ForwardedPaymentEvents::new(
                config.payment.forward_secret.clone(),
            )),
            admin_auth: Arc::new(StaticKeyAuthenticator::new(config.admin.api_key.clone())),
        }
    }
}

/// Running real-time core.
pub struct LiveServices {
    pub hub: HubHandle,
    pub router: EventRouter,
    pub aggregator: Arc<VisitAggregator>,
    pub tokens: Arc<TokenIssuer>,
    pub staging: Arc<OrderStagingCache>,
    pub carts: Arc<dyn CartStore>,
    pub payments: Arc<dyn PaymentEventVerifier>,
    pub admin_auth: Arc<dyn AdminAuthenticator>,
    pub settings: ConnectionSettings,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveServices {
    /// Build every service and spawn the background loops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &AppConfig, deps: LiveDependencies) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);

        let aggregator = Arc::new(VisitAggregator::new(deps.visit_archive));
        let tokens = Arc::new(TokenIssuer::new(config.realtime.token_ttl()));
        let (hub, hub_handle) = Hub::new(aggregator.clone());
        let router = EventRouter::new(hub_handle.clone(), aggregator.clone(), tokens.clone());

        let live: Arc<dyn LiveUpdates> = Arc::new(hub_handle.clone());
        let pipeline = Arc::new(OrderCreationPipeline::new(
            deps.customers,
            deps.orders,
            deps.carts.clone(),
            deps.notifier,
            live,
        ));
        let staging = Arc::new(OrderStagingCache::new(pipeline, config.orders.draft_ttl()));

        let mut tasks = Vec::with_capacity(3);
        tasks.push(tokio::spawn(hub.run(shutdown_rx.clone())));
        tasks.push(spawn_token_sweeper(
            tokens.clone(),
            config.realtime.token_sweep_interval(),
            shutdown_rx.clone(),
        ));
        tasks.push(spawn_draft_sweeper(
            staging.clone(),
            config.orders.sweep_interval(),
            shutdown_rx,
        ));

        tracing::info!(
            token_ttl_secs = config.realtime.token_ttl_secs,
            draft_ttl_secs = config.orders.draft_ttl_secs,
            "Live services started"
        );

        Self {
            hub: hub_handle,
            router,
            aggregator,
            tokens,
            staging,
            carts: deps.carts,
            payments: deps.payments,
            admin_auth: deps.admin_auth,
            settings: ConnectionSettings {
                pong_wait: config.realtime.pong_wait(),
                queue_capacity: config.realtime.outbound_queue_capacity,
                max_message_bytes: config.realtime.max_message_bytes,
            },
            shutdown,
            tasks,
        }
    }

    /// A receiver that flips to `true` when shutdown begins.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Stop every background loop and wait for them to finish.
    ///
    /// The hub closes every client queue on the way out, so connected
    /// writers send their close frames.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
        tracing::info!("Live services stopped");
    }
}

fn spawn_token_sweeper(
    tokens: Arc<TokenIssuer>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move { tokens.run_sweeper(interval, shutdown).await })
}

fn spawn_draft_sweeper(
    staging: Arc<OrderStagingCache>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move { staging.run_sweeper(interval, shutdown).await })
}
