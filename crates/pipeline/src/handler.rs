//! The command handler lifecycle.
//!
//! Every command runs through the same sequence:
//!
//! ```text
//! Created -> Validated -> PreconditionChecked -> Mutated -> Committed -> Accepted
//!               |                 |                                |
//!               +-----------------+------------ Rejected ----------+
//! ```
//!
//! A [`CommandHandler`] only supplies the per-command strategy: which session
//! to open, what to check, and what to stage. [`execute`] owns the ordering,
//! the notification rules and event publication.

use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bus::{EventPublisher, PublishReport};
use crate::command::{Command, Validated};
use crate::error::PipelineError;
use crate::event::{DomainEvent, Event, PendingEvent};
use crate::notification::{DomainNotification, Notifications};
use crate::uow::{CommitError, UnitOfWork};

/// A failed precondition: exactly one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub key: String,
    pub message: String,
}

/// Result of a handler's precondition checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition<T> {
    /// All checks passed; `T` is whatever `apply` needs from them.
    Satisfied(T),
    /// The first failing check.
    Rejected(Rejection),
}

impl<T> Precondition<T> {
    pub fn rejected(key: impl Into<String>, message: impl Into<String>) -> Self {
        Precondition::Rejected(Rejection {
            key: key.into(),
            message: message.into(),
        })
    }
}

/// Per-command strategy plugged into the shared lifecycle.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync + 'static {
    /// Unit of work the operation stages into.
    type Session: UnitOfWork;

    /// Data found by the precondition checks and handed to `apply`.
    type Target: Send;

    /// The single event emitted when the command is accepted.
    type Event: Event;

    /// Opens a fresh operation-scoped session.
    fn begin(&self) -> Self::Session;

    /// Runs the existence/absence checks in order, stopping at the first
    /// failure.
    async fn check(
        &self,
        command: &Validated<C>,
        session: &Self::Session,
    ) -> Result<Precondition<Self::Target>, PipelineError>;

    /// Stages the mutation and returns the event to publish after commit.
    async fn apply(
        &self,
        command: &Validated<C>,
        target: Self::Target,
        session: &mut Self::Session,
    ) -> Result<Self::Event, PipelineError>;
}

/// Lifecycle stages, used for tracing and as the rejection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    Validation,
    Precondition,
    Mutation,
    Commit,
    Publication,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::Validation => "validation",
            LifecycleStage::Precondition => "precondition",
            LifecycleStage::Mutation => "mutation",
            LifecycleStage::Commit => "commit",
            LifecycleStage::Publication => "publication",
        }
    }
}

impl std::fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller gets back from dispatch.
#[derive(Debug)]
pub struct CommandOutcome {
    rejected_at: Option<LifecycleStage>,
    notifications: Notifications,
    event: Option<DomainEvent>,
    publication: Option<PublishReport>,
    commit_failure: Option<CommitError>,
}

impl CommandOutcome {
    fn accepted(event: DomainEvent, publication: PublishReport) -> Self {
        Self {
            rejected_at: None,
            notifications: Notifications::new(),
            event: Some(event),
            publication: Some(publication),
            commit_failure: None,
        }
    }

    fn rejected(stage: LifecycleStage, notifications: Notifications) -> Self {
        Self {
            rejected_at: Some(stage),
            notifications,
            event: None,
            publication: None,
            commit_failure: None,
        }
    }

    fn commit_failed(cause: CommitError) -> Self {
        Self {
            commit_failure: Some(cause),
            ..Self::rejected(LifecycleStage::Commit, Notifications::new())
        }
    }

    /// The boolean result of the operation.
    pub fn is_accepted(&self) -> bool {
        self.rejected_at.is_none()
    }

    pub fn rejected_at(&self) -> Option<LifecycleStage> {
        self.rejected_at
    }

    /// Ordered notifications; empty when accepted or on commit failure.
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn into_notifications(self) -> Notifications {
        self.notifications
    }

    /// The published event, if the command was accepted.
    pub fn event(&self) -> Option<&DomainEvent> {
        self.event.as_ref()
    }

    pub fn publication(&self) -> Option<&PublishReport> {
        self.publication.as_ref()
    }

    /// Structured cause of a failed commit.
    pub fn commit_failure(&self) -> Option<&CommitError> {
        self.commit_failure.as_ref()
    }
}

/// Runs one command through the lifecycle.
///
/// Returns `Err` only for cancellation and faults below the repository
/// interface. Cancellation is honoured up to the commit; once the commit has
/// succeeded the event is always published.
pub async fn execute<C, H>(
    handler: &H,
    command: C,
    publisher: &EventPublisher,
    cancel: &CancellationToken,
) -> Result<CommandOutcome, PipelineError>
where
    C: Command,
    H: CommandHandler<C>,
{
    let started = Instant::now();
    let result = run(handler, command, publisher, cancel).await;

    let outcome_label = match &result {
        Ok(outcome) if outcome.is_accepted() => "accepted",
        Ok(_) => "rejected",
        Err(PipelineError::Cancelled(_)) => "cancelled",
        Err(_) => "failed",
    };
    metrics::counter!("pipeline_commands_total", "command" => C::NAME, "outcome" => outcome_label)
        .increment(1);
    metrics::histogram!("pipeline_command_duration_seconds", "command" => C::NAME)
        .record(started.elapsed().as_secs_f64());

    if let Ok(outcome) = &result
        && let Some(stage) = outcome.rejected_at()
    {
        metrics::counter!("pipeline_commands_rejected_total", "stage" => stage.as_str())
            .increment(1);
    }

    result
}

async fn run<C, H>(
    handler: &H,
    command: C,
    publisher: &EventPublisher,
    cancel: &CancellationToken,
) -> Result<CommandOutcome, PipelineError>
where
    C: Command,
    H: CommandHandler<C>,
{
    let aggregate_id = command.aggregate_id();

    let command = match Validated::try_new(command) {
        Ok(command) => command,
        Err(errors) => {
            tracing::warn!(
                command = C::NAME,
                errors = errors.len(),
                "command failed validation"
            );
            let notifications = Notifications::from_validation(&errors, &aggregate_id);
            return Ok(CommandOutcome::rejected(
                LifecycleStage::Validation,
                notifications,
            ));
        }
    };
    tracing::debug!(stage = %LifecycleStage::Validation, "command validated");

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(C::NAME));
    }

    let mut session = handler.begin();

    let target = match handler.check(&command, &session).await? {
        Precondition::Satisfied(target) => target,
        Precondition::Rejected(rejection) => {
            tracing::warn!(
                command = C::NAME,
                key = %rejection.key,
                message = %rejection.message,
                "command rejected by precondition"
            );
            let notifications = Notifications::from_iter([DomainNotification::new(
                rejection.key,
                rejection.message,
                aggregate_id,
            )]);
            return Ok(CommandOutcome::rejected(
                LifecycleStage::Precondition,
                notifications,
            ));
        }
    };
    tracing::debug!(stage = %LifecycleStage::Precondition, "preconditions satisfied");

    let event = handler.apply(&command, target, &mut session).await?;
    let pending = PendingEvent::new(aggregate_id, &event)?;
    tracing::debug!(
        stage = %LifecycleStage::Mutation,
        pending = session.pending(),
        "mutation staged"
    );

    if cancel.is_cancelled() {
        tracing::debug!(command = C::NAME, "cancelled before commit");
        return Err(PipelineError::Cancelled(C::NAME));
    }

    if let Err(cause) = session.commit().await {
        tracing::warn!(command = C::NAME, error = %cause, "commit failed");
        return Ok(CommandOutcome::commit_failed(cause));
    }
    tracing::debug!(
        stage = %LifecycleStage::Commit,
        kind = pending.kind(),
        "unit of work committed"
    );

    let event = pending.committed();
    let report = publisher.publish(&event);
    tracing::debug!(
        stage = %LifecycleStage::Publication,
        kind = event.kind(),
        delivered = report.delivered,
        "event published"
    );

    Ok(CommandOutcome::accepted(event, report))
}
