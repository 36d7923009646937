//! High-level kitchen client

use crate::builder::{KitchenClientBuilder, StoreGateConfig};
use crate::error::{ClientError, ClientResult};
use crate::events::{AlarmEvent, DisplayEvent, EventReceiver, EventSender, FeedEvent, GateEvent};
use crate::gate::{StoreGate, StoreStatus};
use chrono::Utc;
use futures::StreamExt;
use kds_board::BoardState;
use kds_feed::{DocumentStore, FieldMap, Subscription};
use kds_types::{Order, OrderStatus, Snapshot, READY_AT_FIELD, STATUS_FIELD};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Banner shown while the orders feed is failing
pub const FEED_ERROR_MESSAGE: &str =
    "No se pudieron cargar los pedidos. Revisa la conexión o Firestore.";
/// Notice after a failed mark-ready write
pub const MARK_READY_FAILED: &str = "No se pudo marcar como listo. Revisa la conexión.";
/// Notice after a failed close-store write
pub const CLOSE_STORE_FAILED: &str = "No se pudo cerrar la tienda.";
/// Notice after a failed open-store write
pub const OPEN_STORE_FAILED: &str = "No se pudo abrir la tienda.";

/// State shared between the client handle and its pump tasks
struct Shared {
    store: Arc<dyn DocumentStore>,
    board: RwLock<BoardState>,
    gate: RwLock<StoreGate>,
    event_tx: EventSender,
    shutdown: AtomicBool,
}

impl Shared {
    fn emit(&self, event: impl Into<DisplayEvent>) {
        // receiver may have been dropped by a headless caller
        let _ = self.event_tx.send(event.into());
    }

    fn notice(&self, message: &str) {
        self.board.write().push_notice(message);
        self.emit(DisplayEvent::Notice {
            message: message.to_string(),
        });
    }

    fn apply_orders(&self, snapshot: &Snapshot) {
        let (outcome, recovered, pending, completed) = {
            let mut board = self.board.write();
            let recovered = board.feed_error().is_some();
            let outcome = board.apply_snapshot(snapshot, Utc::now());
            (outcome, recovered, board.pending().len(), board.completed().len())
        };

        debug!(
            "Applied orders snapshot: {} documents, {} pending, {} completed",
            snapshot.len(),
            pending,
            completed
        );
        if recovered {
            info!("Orders feed recovered");
            self.emit(FeedEvent::Recovered);
        }
        self.emit(FeedEvent::Updated {
            pending,
            completed,
            baseline: outcome.baseline,
        });

        if let Some(order) = outcome.surfaced {
            info!(
                "New order {} surfaced ({} new pending)",
                order.id,
                outcome.new_pending.len()
            );
            self.emit(AlarmEvent::Raised {
                order,
                new_pending: outcome.new_pending.len(),
            });
        }
    }

    fn orders_failed(&self, error: kds_feed::FeedError) {
        warn!("Orders feed error: {}", error);
        self.board.write().set_feed_error(FEED_ERROR_MESSAGE);
        self.emit(FeedEvent::Failed {
            message: FEED_ERROR_MESSAGE.to_string(),
            error,
        });
    }
}

fn gate_fields(gate: &StoreGateConfig, open: bool) -> FieldMap {
    FieldMap::new()
        .set(&gate.field, open)
        .server_timestamp(&gate.updated_at_field)
}

async fn run_orders(shared: Arc<Shared>, mut feed: Subscription) {
    while let Some(item) = feed.next().await {
        match item {
            Ok(snapshot) => shared.apply_orders(&snapshot),
            Err(error) => shared.orders_failed(error),
        }
    }
    debug!("Orders feed closed");
    shared.emit(FeedEvent::Closed);
}

async fn run_gate(shared: Arc<Shared>, mut feed: Subscription, config: StoreGateConfig) {
    while let Some(item) = feed.next().await {
        match item {
            Ok(snapshot) => {
                let update = shared
                    .gate
                    .write()
                    .apply_snapshot(&snapshot, &config.document, &config.field);

                if update.create_open {
                    info!(
                        "Store gate {}/{} missing, creating it open",
                        config.collection, config.document
                    );
                    match shared
                        .store
                        .upsert(&config.collection, &config.document, gate_fields(&config, true))
                        .await
                    {
                        Ok(()) => shared.emit(GateEvent::Created),
                        Err(e) => warn!("Failed to create store gate: {}", e),
                    }
                }
                if update.changed {
                    let status = shared.gate.read().status();
                    info!("Store status: {}", status);
                    shared.emit(GateEvent::StatusChanged { status });
                }
            }
            Err(error) => {
                warn!("Store gate error: {}", error);
                let changed = shared.gate.write().apply_error();
                shared.emit(GateEvent::ReadFailed {
                    message: crate::gate::GATE_ERROR_MESSAGE.to_string(),
                });
                if changed {
                    shared.emit(GateEvent::StatusChanged {
                        status: StoreStatus::Open,
                    });
                }
            }
        }
    }
    debug!("Store gate feed closed");
}

/// High-level client for the kitchen display
///
/// Watches the orders collection (and optionally the store gate document),
/// keeps a [`BoardState`] current and publishes [`DisplayEvent`]s.
///
/// # Example
///
/// ```no_run
/// use kds_client::KitchenClient;
/// use kds_feed::MemoryStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = KitchenClient::builder()
///         .connect(Arc::new(MemoryStore::new()))
///         .await?;
///
///     let mut events = client.events().unwrap();
///     while let Some(event) = events.recv().await {
///         println!("{:?}", event);
///         let pending = client.with_board(|board| board.pending().len());
///         println!("{} pending", pending);
///     }
///     Ok(())
/// }
/// ```
pub struct KitchenClient {
    shared: Arc<Shared>,
    config: KitchenClientBuilder,
    event_rx: Option<EventReceiver>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl KitchenClient {
    /// Create a new client builder
    pub fn builder() -> KitchenClientBuilder {
        KitchenClientBuilder::new()
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &KitchenClientBuilder {
        &self.config
    }

    /// Name of the backing store
    pub fn store_name(&self) -> &'static str {
        self.shared.store.name()
    }

    /// Take the event receiver (can only be called once)
    pub fn events(&mut self) -> Option<EventReceiver> {
        self.event_rx.take()
    }

    /// Read the board
    pub fn with_board<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.shared.board.read())
    }

    /// Mutate the board (filters, selection)
    pub fn with_board_mut<R>(&self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        f(&mut self.shared.board.write())
    }

    /// Returns true while a new-order alarm awaits acknowledgment
    pub fn is_alarm_active(&self) -> bool {
        self.shared.board.read().is_alarm_active()
    }

    /// Current store gate state
    pub fn store_gate(&self) -> StoreGate {
        self.shared.gate.read().clone()
    }

    /// Current store status
    pub fn store_status(&self) -> StoreStatus {
        self.shared.gate.read().status()
    }

    /// Take the pending one-shot notice
    pub fn take_notice(&self) -> Option<String> {
        self.shared.board.write().take_notice()
    }

    /// Returns true after [`shutdown`](Self::shutdown)
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    fn ensure_running(&self) -> ClientResult<()> {
        if self.is_shut_down() {
            Err(ClientError::ShutDown)
        } else {
            Ok(())
        }
    }

    /// Acknowledge the new-order alarm
    ///
    /// Returns the surfaced order, or `None` if no alarm was active.
    pub fn acknowledge_alarm(&self) -> Option<Order> {
        let order = self.shared.board.write().acknowledge_alarm()?;
        info!("Alarm acknowledged for order {}", order.id);
        self.shared.emit(AlarmEvent::Acknowledged {
            order_id: order.id.clone(),
        });
        Some(order)
    }

    /// Mark a pending order ready
    ///
    /// Writes the ready status and a server-assigned ready time. The board is
    /// not touched; the next feed snapshot moves the order. On failure a
    /// notice is queued and the error returned.
    #[instrument(skip(self))]
    pub async fn mark_ready(&self, order_id: &str) -> ClientResult<()> {
        self.ensure_running()?;
        let known = self.shared.board.read().reconciler().find(order_id).is_some();
        if !known {
            return Err(ClientError::UnknownOrder {
                id: order_id.to_string(),
            });
        }

        let status = OrderStatus::Ready.code().unwrap_or("2");
        let fields = FieldMap::new()
            .set(STATUS_FIELD, status)
            .server_timestamp(READY_AT_FIELD);

        if let Err(error) = self
            .shared
            .store
            .update_fields(&self.config.orders_collection, order_id, fields)
            .await
        {
            warn!("Failed to mark order {} ready: {}", order_id, error);
            self.shared.notice(MARK_READY_FAILED);
            return Err(error.into());
        }

        info!("Order {} marked ready", order_id);
        self.shared.emit(DisplayEvent::OrderReady {
            order_id: order_id.to_string(),
        });
        Ok(())
    }

    /// Open or close the store
    ///
    /// Closing requires the gate document to exist; opening creates it if
    /// needed. Both stamp the server time.
    #[instrument(skip(self))]
    pub async fn set_store_open(&self, open: bool) -> ClientResult<()> {
        self.ensure_running()?;
        let gate = self.config.store_gate.as_ref().ok_or(ClientError::GateDisabled)?;
        let fields = gate_fields(gate, open);

        let result = if open {
            self.shared
                .store
                .upsert(&gate.collection, &gate.document, fields)
                .await
        } else {
            self.shared
                .store
                .update_fields(&gate.collection, &gate.document, fields)
                .await
        };

        match result {
            Ok(()) => {
                info!("Store {}", if open { "opened" } else { "closed" });
                Ok(())
            }
            Err(error) => {
                warn!("Failed to set store open={}: {}", open, error);
                self.shared
                    .notice(if open { OPEN_STORE_FAILED } else { CLOSE_STORE_FAILED });
                Err(error.into())
            }
        }
    }

    /// Stop the feeds, silence the alarm and drop transient state
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.shared.board.write().teardown();
        self.shared.emit(DisplayEvent::Shutdown);
        info!("Kitchen client shut down");
    }
}

impl Drop for KitchenClient {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

impl KitchenClientBuilder {
    /// Subscribe to the store and return a running client
    ///
    /// Must be called inside a tokio runtime; one pump task is spawned per
    /// subscription.
    #[instrument(skip(self, store), fields(store = store.name(), collection = %self.orders_collection))]
    pub async fn connect(self, store: Arc<dyn DocumentStore>) -> ClientResult<KitchenClient> {
        self.validate()?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let gate = match self.store_gate {
            Some(_) => StoreGate::new(),
            None => StoreGate::always_open(),
        };
        let shared = Arc::new(Shared {
            store: Arc::clone(&store),
            board: RwLock::new(BoardState::with_policy(self.baseline_policy)),
            gate: RwLock::new(gate),
            event_tx,
            shutdown: AtomicBool::new(false),
        });

        // subscribe everything before spawning so a failure leaves nothing running
        let gate_feed = match &self.store_gate {
            Some(gate) => Some((store.subscribe(gate.query())?, gate.clone())),
            None => None,
        };
        let orders_feed = store.subscribe(self.orders_query())?;

        let mut tasks = Vec::new();
        if let Some((feed, gate)) = gate_feed {
            tasks.push(tokio::spawn(run_gate(Arc::clone(&shared), feed, gate)));
        }
        tasks.push(tokio::spawn(run_orders(Arc::clone(&shared), orders_feed)));

        info!(
            "Kitchen client created on {} for collection {}",
            store.name(),
            self.orders_collection
        );

        Ok(KitchenClient {
            shared,
            config: self,
            event_rx: Some(event_rx),
            tasks: Mutex::new(tasks),
        })
    }
}
