//! In-process mediator: command dispatch and event publication.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::error::PipelineError;
use crate::event::{DomainEvent, EventSubscriber};
use crate::handler::{self, CommandHandler, CommandOutcome};

/// Delivery summary of one publication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub failed: Vec<&'static str>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
struct Subscription {
    kind: Option<&'static str>,
    subscriber: Arc<dyn EventSubscriber>,
}

/// Fans events out to subscribers in registration order.
#[derive(Clone, Default)]
pub struct EventPublisher {
    subscriptions: Vec<Subscription>,
}

impl EventPublisher {
    /// Subscribes to one event kind.
    pub fn subscribe(&mut self, kind: &'static str, subscriber: Arc<dyn EventSubscriber>) {
        self.subscriptions.push(Subscription {
            kind: Some(kind),
            subscriber,
        });
    }

    /// Subscribes to every event kind.
    pub fn subscribe_all(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscriptions.push(Subscription {
            kind: None,
            subscriber,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Delivers `event` to every matching subscriber.
    ///
    /// Runs synchronously. A failing subscriber is logged and counted and the
    /// remaining subscribers still receive the event.
    pub fn publish(&self, event: &DomainEvent) -> PublishReport {
        let mut report = PublishReport::default();

        for subscription in self
            .subscriptions
            .iter()
            .filter(|s| s.kind.is_none_or(|kind| kind == event.kind()))
        {
            match subscription.subscriber.handle(event) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    tracing::error!(
                        subscriber = subscription.subscriber.name(),
                        kind = event.kind(),
                        aggregate_id = %event.aggregate_id(),
                        %error,
                        "subscriber failed to handle event"
                    );
                    metrics::counter!("pipeline_subscriber_failures_total").increment(1);
                    report.failed.push(subscription.subscriber.name());
                }
            }
        }

        metrics::counter!("pipeline_events_published_total", "kind" => event.kind()).increment(1);
        report
    }
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle(
        &self,
        command: Box<dyn Any + Send>,
        publisher: &EventPublisher,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, PipelineError>;
}

struct Registered<C, H> {
    handler: H,
    _command: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, H> ErasedHandler for Registered<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle(
        &self,
        command: Box<dyn Any + Send>,
        publisher: &EventPublisher,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, PipelineError> {
        let command = command
            .downcast::<C>()
            .map_err(|_| PipelineError::CommandTypeMismatch { expected: C::NAME })?;
        handler::execute(&self.handler, *command, publisher, cancel).await
    }
}

/// Routes each command to its single handler and publishes the resulting
/// events.
///
/// Built once at startup with [`BusBuilder`]; immutable afterwards and safe
/// to share between concurrent operations.
pub struct Bus {
    handlers: HashMap<TypeId, Arc<dyn ErasedHandler>>,
    publisher: EventPublisher,
}

impl Bus {
    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    /// Dispatches `command` to its handler.
    pub async fn dispatch<C: Command>(&self, command: C) -> Result<CommandOutcome, PipelineError> {
        self.dispatch_with_cancel(command, &CancellationToken::new())
            .await
    }

    /// Dispatches `command`, aborting before commit if `cancel` fires.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, command, cancel),
        fields(command = C::NAME, aggregate_id = %command.aggregate_id())
    )]
    pub async fn dispatch_with_cancel<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, PipelineError> {
        let handler = self
            .handlers
            .get(&TypeId::of::<C>())
            .ok_or(PipelineError::NoHandlerRegistered(C::NAME))?;

        handler.handle(Box::new(command), &self.publisher, cancel).await
    }

    /// Publishes an event outside of a command lifecycle.
    pub fn publish(&self, event: &DomainEvent) -> PublishReport {
        self.publisher.publish(event)
    }

    pub fn has_handler<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Startup-time registry for handlers and subscribers.
#[derive(Default)]
pub struct BusBuilder {
    handlers: HashMap<TypeId, Arc<dyn ErasedHandler>>,
    duplicates: Vec<&'static str>,
    publisher: EventPublisher,
}

impl BusBuilder {
    /// Registers `handler` as the handler for commands of type `C`.
    pub fn register_handler<C, H>(mut self, handler: H) -> Self
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let registered = Registered::<C, H> {
            handler,
            _command: PhantomData,
        };
        if self
            .handlers
            .insert(TypeId::of::<C>(), Arc::new(registered))
            .is_some()
        {
            self.duplicates.push(C::NAME);
        }
        self
    }

    pub fn subscribe(mut self, kind: &'static str, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.publisher.subscribe(kind, subscriber);
        self
    }

    pub fn subscribe_all(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.publisher.subscribe_all(subscriber);
        self
    }

    /// Builds the bus, rejecting duplicate handlers and an empty subscriber
    /// chain.
    pub fn build(self) -> Result<Bus, PipelineError> {
        if let Some(&name) = self.duplicates.first() {
            return Err(PipelineError::DuplicateHandler(name));
        }
        if self.publisher.subscriber_count() == 0 {
            return Err(PipelineError::NoSubscribers);
        }

        tracing::info!(
            handlers = self.handlers.len(),
            subscribers = self.publisher.subscriber_count(),
            "command bus built"
        );

        Ok(Bus {
            handlers: self.handlers,
            publisher: self.publisher,
        })
    }
}
