//! Test fixtures: a tiny settings aggregate running on the pipeline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::command::{Command, Validated, ValidationResult, required, run_rules};
use crate::error::PipelineError;
use crate::event::{DomainEvent, Event, EventSubscriber, SubscriberError};
use crate::handler::{CommandHandler, Precondition};
use crate::uow::{CommitError, MemorySession, MemoryStore, UnitOfWork};

pub type Settings = BTreeMap<String, String>;
pub type SettingsStore = MemoryStore<Settings>;

impl MemoryStore<Settings> {
    pub async fn get(&self, key: &str) -> Option<String> {
        self.read(|s| s.get(key).cloned()).await
    }
}

#[derive(Debug, Clone)]
pub struct PutSetting {
    pub key: String,
    pub value: String,
}

impl PutSetting {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl Command for PutSetting {
    const NAME: &'static str = "PutSetting";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.key)
    }

    fn validate(&self) -> ValidationResult {
        run_rules(self, &[key_required, value_required])
    }
}

fn key_required(c: &PutSetting) -> ValidationResult {
    required("Key", &c.key, "Key is required")
}

fn value_required(c: &PutSetting) -> ValidationResult {
    required("Value", &c.value, "Value is required")
}

#[derive(Debug, Clone)]
pub struct DeleteSetting {
    pub key: String,
}

impl DeleteSetting {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl Command for DeleteSetting {
    const NAME: &'static str = "DeleteSetting";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::new(&self.key)
    }

    fn validate(&self) -> ValidationResult {
        required("Key", &self.key, "Key is required")
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum SettingEvent {
    SettingPut { key: String, value: String },
    SettingDeleted { key: String },
}

impl Event for SettingEvent {
    const AGGREGATE_TYPE: &'static str = "Setting";

    fn kind(&self) -> &'static str {
        match self {
            SettingEvent::SettingPut { .. } => "SettingPut",
            SettingEvent::SettingDeleted { .. } => "SettingDeleted",
        }
    }
}

#[derive(Clone)]
pub struct SettingsHandler {
    store: SettingsStore,
    sessions: Arc<AtomicUsize>,
}

impl SettingsHandler {
    pub fn new(store: SettingsStore) -> Self {
        Self {
            store,
            sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    fn open(&self) -> MemorySession<Settings> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        self.store.session()
    }
}

#[async_trait]
impl CommandHandler<PutSetting> for SettingsHandler {
    type Session = MemorySession<Settings>;
    type Target = ();
    type Event = SettingEvent;

    fn begin(&self) -> Self::Session {
        self.open()
    }

    async fn check(
        &self,
        _command: &Validated<PutSetting>,
        _session: &Self::Session,
    ) -> Result<Precondition<()>, PipelineError> {
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<PutSetting>,
        _target: (),
        session: &mut Self::Session,
    ) -> Result<SettingEvent, PipelineError> {
        let (key, value) = (command.key.clone(), command.value.clone());
        session.stage(move |s| {
            s.insert(key, value);
            Ok(())
        });
        Ok(SettingEvent::SettingPut {
            key: command.key.clone(),
            value: command.value.clone(),
        })
    }
}

#[async_trait]
impl CommandHandler<DeleteSetting> for SettingsHandler {
    type Session = MemorySession<Settings>;
    type Target = ();
    type Event = SettingEvent;

    fn begin(&self) -> Self::Session {
        self.open()
    }

    async fn check(
        &self,
        command: &Validated<DeleteSetting>,
        session: &Self::Session,
    ) -> Result<Precondition<()>, PipelineError> {
        if !session.read(|s| s.contains_key(&command.key)).await {
            return Ok(Precondition::rejected("Setting", "Setting not found"));
        }
        Ok(Precondition::Satisfied(()))
    }

    async fn apply(
        &self,
        command: &Validated<DeleteSetting>,
        _target: (),
        session: &mut Self::Session,
    ) -> Result<SettingEvent, PipelineError> {
        let key = command.key.clone();
        session.stage(move |s| {
            s.remove(&key);
            Ok(())
        });
        Ok(SettingEvent::SettingDeleted {
            key: command.key.clone(),
        })
    }
}

/// Point at which [`InterruptingHandler`] cancels its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    DuringApply,
    AfterCommit,
}

/// Runs [`PutSetting`] like [`SettingsHandler`] but cancels `cancel` at a
/// chosen point, and records when its session committed.
pub struct InterruptingHandler {
    inner: SettingsHandler,
    cancel: CancellationToken,
    at: Interrupt,
    committed_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl InterruptingHandler {
    pub fn new(store: SettingsStore, cancel: CancellationToken, at: Interrupt) -> Self {
        Self {
            inner: SettingsHandler::new(store),
            cancel,
            at,
            committed_at: Arc::new(Mutex::new(None)),
        }
    }

    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        *self.committed_at.lock().unwrap()
    }
}

pub struct InterruptingSession {
    inner: MemorySession<Settings>,
    cancel_after_commit: Option<CancellationToken>,
    committed_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

#[async_trait]
impl UnitOfWork for InterruptingSession {
    async fn commit(&mut self) -> Result<(), CommitError> {
        self.inner.commit().await?;
        *self.committed_at.lock().unwrap() = Some(Utc::now());
        if let Some(cancel) = &self.cancel_after_commit {
            cancel.cancel();
        }
        Ok(())
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

#[async_trait]
impl CommandHandler<PutSetting> for InterruptingHandler {
    type Session = InterruptingSession;
    type Target = ();
    type Event = SettingEvent;

    fn begin(&self) -> Self::Session {
        InterruptingSession {
            inner: self.inner.open(),
            cancel_after_commit: (self.at == Interrupt::AfterCommit).then(|| self.cancel.clone()),
            committed_at: Arc::clone(&self.committed_at),
        }
    }

    async fn check(
        &self,
        command: &Validated<PutSetting>,
        session: &Self::Session,
    ) -> Result<Precondition<()>, PipelineError> {
        CommandHandler::<PutSetting>::check(&self.inner, command, &session.inner).await
    }

    async fn apply(
        &self,
        command: &Validated<PutSetting>,
        target: (),
        session: &mut Self::Session,
    ) -> Result<SettingEvent, PipelineError> {
        if self.at == Interrupt::DuringApply {
            self.cancel.cancel();
        }
        CommandHandler::<PutSetting>::apply(&self.inner, command, target, &mut session.inner).await
    }
}

/// Records the kinds of the events it receives.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<&'static str>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.seen.lock().unwrap().clone()
    }
}

impl EventSubscriber for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError> {
        self.seen.lock().unwrap().push(event.kind());
        Ok(())
    }
}

/// Always fails.
pub struct Failing;

impl EventSubscriber for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn handle(&self, _event: &DomainEvent) -> Result<(), SubscriberError> {
        Err(SubscriberError::Other("boom".to_string()))
    }
}
