//! Service bridge
//!
//! The Bridge feeds service lifecycle events into a registry adapter:
//! - Validates each service before it reaches the adapter
//! - Calls the adapter once per event (no retries, no batching)
//! - Tracks which services it has published, in memory only
//! - Withdraws published services on shutdown (optional)
//!
//! ## Event Flow
//!
//! ```text
//! ┌───────────────┐
//! │ service source│─── ServiceEvent ───┐
//! └───────────────┘                    │
//!                                      ▼
//!                              ┌──────────────┐
//!                              │    Bridge    │─── BridgeEvent ───▶ observers
//!                              └──────────────┘
//!                                      │
//!                                      ▼
//!                            ┌──────────────────┐
//!                            │ RegistryAdapter  │
//!                            └──────────────────┘
//! ```

use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::service::Service;
use crate::traits::{DeregisterOutcome, RegisterOutcome, RegistryAdapter};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Service lifecycle events consumed by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A service appeared
    Register(Service),
    /// A service went away
    Deregister(Service),
    /// A service is still alive
    Refresh(Service),
}

/// Events emitted by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// Bridge started
    Started {
        adapter: &'static str,
    },

    /// Service registered
    Registered {
        service_id: String,
        outcome: RegisterOutcome,
    },

    /// Service deregistered
    Deregistered {
        service_id: String,
        outcome: DeregisterOutcome,
    },

    /// Service refreshed
    Refreshed {
        service_id: String,
    },

    /// An adapter call failed or the service was rejected
    Failed {
        service_id: String,
        operation: &'static str,
        error: String,
    },

    /// Bridge stopped
    Stopped {
        reason: String,
    },
}

/// Bridge between a service source and a registry adapter
pub struct Bridge {
    /// Registry adapter receiving the services
    adapter: Box<dyn RegistryAdapter>,

    /// Services published through this bridge, keyed by service ID
    registered: Mutex<HashMap<String, Service>>,

    /// Withdraw published services when the bridge stops
    deregister_on_shutdown: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<BridgeEvent>,
}

impl Bridge {
    /// Create a new bridge
    ///
    /// # Returns
    ///
    /// A tuple of (bridge, event_receiver) where event_receiver yields bridge events
    pub fn new(
        adapter: Box<dyn RegistryAdapter>,
        config: BridgeConfig,
    ) -> Result<(Self, mpsc::Receiver<BridgeEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let bridge = Self {
            adapter,
            registered: Mutex::new(HashMap::new()),
            deregister_on_shutdown: config.deregister_on_shutdown,
            event_tx: tx,
        };

        Ok((bridge, rx))
    }

    /// Run the bridge until ctrl-c
    pub async fn run<S>(&self, events: S) -> Result<()>
    where
        S: Stream<Item = ServiceEvent> + Send,
    {
        self.run_internal(events, None).await
    }

    /// Run the bridge until the given shutdown signal fires
    ///
    /// With `None`, this behaves like [`Bridge::run`].
    pub async fn run_with_shutdown<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = ServiceEvent> + Send,
    {
        self.run_internal(events, shutdown_rx).await
    }

    async fn run_internal<S>(
        &self,
        events: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = ServiceEvent> + Send,
    {
        let adapter = self.adapter.adapter_name();
        info!("Bridge started with adapter {}", adapter);
        self.emit_event(BridgeEvent::Started { adapter });

        let mut events = Box::pin(events);

        if let Some(mut rx) = shutdown_rx {
            loop {
                tokio::select! {
                    Some(event) = events.next() => {
                        if let Err(e) = self.handle(event).await {
                            debug!("Service event not applied: {}", e);
                        }
                    }

                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            loop {
                tokio::select! {
                    Some(event) = events.next() => {
                        if let Err(e) = self.handle(event).await {
                            debug!("Service event not applied: {}", e);
                        }
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        if self.deregister_on_shutdown {
            self.deregister_all().await;
        }

        self.emit_event(BridgeEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        info!("Bridge stopped");

        Ok(())
    }

    /// Apply a single service event
    ///
    /// Failures are logged and emitted as [`BridgeEvent::Failed`] before
    /// being returned.
    pub async fn handle(&self, event: ServiceEvent) -> Result<()> {
        match event {
            ServiceEvent::Register(service) => self.register(service).await,
            ServiceEvent::Deregister(service) => self.deregister(service).await,
            ServiceEvent::Refresh(service) => self.refresh(service).await,
        }
    }

    /// Services currently published through this bridge, sorted by ID
    pub fn registered_services(&self) -> Vec<Service> {
        let registered = self.lock_registered();
        let mut services: Vec<Service> = registered.values().cloned().collect();
        services.sort_by(|a, b| a.id.cmp(&b.id));
        services
    }

    async fn register(&self, service: Service) -> Result<()> {
        if let Err(e) = service.validate() {
            return Err(self.fail(&service.id, "register", e));
        }

        match self.adapter.register(&service).await {
            Ok(outcome) => {
                match &outcome {
                    RegisterOutcome::Created { record_name } => {
                        info!("Registered {} as new record {}", service.id, record_name)
                    }
                    RegisterOutcome::Merged {
                        record_name,
                        records,
                    } => info!(
                        "Registered {} into {} ({} records)",
                        service.id, record_name, records
                    ),
                    RegisterOutcome::Unchanged { record_name } => {
                        debug!("Service {} already present in {}", service.id, record_name)
                    }
                }

                let service_id = service.id.clone();
                self.lock_registered().insert(service_id.clone(), service);
                self.emit_event(BridgeEvent::Registered {
                    service_id,
                    outcome,
                });
                Ok(())
            }
            Err(e) => Err(self.fail(&service.id, "register", e)),
        }
    }

    async fn deregister(&self, service: Service) -> Result<()> {
        match self.adapter.deregister(&service).await {
            Ok(outcome) => {
                match &outcome {
                    DeregisterOutcome::Deleted { record_name } => {
                        info!("Deregistered {}, deleted {}", service.id, record_name)
                    }
                    DeregisterOutcome::Pruned {
                        record_name,
                        remaining,
                    } => info!(
                        "Deregistered {} from {} ({} remaining)",
                        service.id, record_name, remaining
                    ),
                    DeregisterOutcome::NotFound { record_name } => {
                        debug!("Service {} not present in {}", service.id, record_name)
                    }
                }

                self.lock_registered().remove(&service.id);
                self.emit_event(BridgeEvent::Deregistered {
                    service_id: service.id,
                    outcome,
                });
                Ok(())
            }
            Err(e) => Err(self.fail(&service.id, "deregister", e)),
        }
    }

    async fn refresh(&self, service: Service) -> Result<()> {
        match self.adapter.refresh(&service).await {
            Ok(()) => {
                self.emit_event(BridgeEvent::Refreshed {
                    service_id: service.id,
                });
                Ok(())
            }
            Err(e) => Err(self.fail(&service.id, "refresh", e)),
        }
    }

    /// Withdraw every published service, continuing past failures
    async fn deregister_all(&self) {
        let services = self.registered_services();
        if services.is_empty() {
            return;
        }

        info!("Deregistering {} service(s) before shutdown", services.len());
        for service in services {
            if let Err(e) = self.deregister(service).await {
                debug!("Shutdown deregistration failed: {}", e);
            }
        }
    }

    fn fail(&self, service_id: &str, operation: &'static str, e: Error) -> Error {
        if e.is_transient() {
            warn!("Failed to {} {}: {}", operation, service_id, e);
        } else {
            error!("Failed to {} {}: {}", operation, service_id, e);
        }

        self.emit_event(BridgeEvent::Failed {
            service_id: service_id.to_string(),
            operation,
            error: e.to_string(),
        });
        e
    }

    fn lock_registered(&self) -> std::sync::MutexGuard<'_, HashMap<String, Service>> {
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit_event(&self, event: BridgeEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
