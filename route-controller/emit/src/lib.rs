#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Asynchronous dispatch of route messages to the pub/sub transport.

mod metrics;
mod nats;

pub use self::metrics::Metrics;
pub use self::nats::NatsPublisher;

use route_sync_controller_core::{Emit, EmitError, Message};
use tokio::sync::mpsc;

/// Which transport channel a message is delivered on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteSubject {
    Register,
    Unregister,
}

/// Delivers one message on one transport channel.
///
/// Accepted-for-dispatch semantics only; there is no delivery confirmation
/// contract, and downstream consumers must tolerate duplicates.
#[async_trait::async_trait]
pub trait RoutePublisher: Send + Sync + 'static {
    async fn publish(&self, subject: RouteSubject, message: &Message) -> anyhow::Result<()>;
}

/// Builds the emitter handle and its background dispatch worker.
pub fn channel<P: RoutePublisher>(
    publisher: P,
    capacity: usize,
    metrics: Metrics,
) -> (Emitter, Dispatch<P>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        Emitter {
            tx,
            metrics: metrics.clone(),
        },
        Dispatch {
            rx,
            publisher,
            metrics,
        },
    )
}

/// Non-blocking hand-off into the bounded outbound buffer.
///
/// When the buffer is full the message is dropped and counted; the periodic
/// resync bounds the staleness that a drop can cause.
#[derive(Clone)]
pub struct Emitter {
    tx: mpsc::Sender<Message>,
    metrics: Metrics,
}

impl Emit for Emitter {
    fn emit(&self, message: Message) -> Result<(), EmitError> {
        self.tx.try_send(message).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => {
                self.metrics.dropped.inc();
                EmitError::Full
            }
            mpsc::error::TrySendError::Closed(_) => EmitError::Closed,
        })
    }
}

/// Drains the outbound buffer, publishing each message on the register
/// and/or unregister channel depending on which delta lists it carries.
pub struct Dispatch<P> {
    rx: mpsc::Receiver<Message>,
    publisher: P,
    metrics: Metrics,
}

impl<P: RoutePublisher> Dispatch<P> {
    pub async fn run(mut self) {
        while let Some(message) = self.rx.recv().await {
            if !message.routes.registered.is_empty() {
                self.publish(RouteSubject::Register, &message).await;
            }
            if !message.routes.unregistered.is_empty() {
                self.publish(RouteSubject::Unregister, &message).await;
            }
        }
        tracing::debug!("Emitter handles dropped; dispatch loop exiting");
    }

    async fn publish(&self, subject: RouteSubject, message: &Message) {
        match self.publisher.publish(subject, message).await {
            Ok(()) => {
                self.metrics.emitted.inc();
            }
            Err(error) => {
                self.metrics.failed.inc();
                tracing::warn!(
                    ?subject,
                    name = %message.name,
                    instance = %message.instance_id,
                    %error,
                    "Failed to publish route message",
                );
            }
        }
    }
}
