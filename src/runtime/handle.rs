use std::collections::BTreeSet;
use std::{
    error::Error,
    fmt::{Display, Formatter},
};

use log::info;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    core::book::{BookError, RecordBook},
    index::TagFrequency,
    persist::BlobStore,
    record::Record,
    types::{Clock, RecordId},
};

use super::events::RecordEvent;

/// Failure returned through a [`RecordsHandle`].
#[derive(Debug)]
pub enum RuntimeError {
    /// The book declined or failed the command.
    Book(BookError),
    /// The runtime task has stopped.
    ChannelClosed,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book(err) => write!(f, "{err}"),
            Self::ChannelClosed => write!(f, "record runtime has stopped"),
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Book(err) => Some(err),
            Self::ChannelClosed => None,
        }
    }
}

impl From<BookError> for RuntimeError {
    fn from(value: BookError) -> Self {
        Self::Book(value)
    }
}

/// Channel sizing for [`spawn_records`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending commands before senders wait.
    pub command_queue_bound: usize,
    /// Events buffered per subscriber before it lags.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

/// Cloneable sender side of a running record book.
pub struct RecordsHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<RecordEvent>,
}

impl Clone for RecordsHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Create {
        tags: Vec<String>,
        resp: oneshot::Sender<Result<Record, RuntimeError>>,
    },
    Update {
        id: RecordId,
        tags: Vec<String>,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Delete {
        id: RecordId,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Import {
        text: String,
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    Export {
        resp: oneshot::Sender<Result<String, RuntimeError>>,
    },
    Get {
        id: RecordId,
        resp: oneshot::Sender<Option<Record>>,
    },
    List {
        resp: oneshot::Sender<Vec<Record>>,
    },
    Search {
        query: String,
        resp: oneshot::Sender<Vec<Record>>,
    },
    Frequencies {
        query: String,
        resp: oneshot::Sender<Vec<TagFrequency>>,
    },
    Universe {
        resp: oneshot::Sender<BTreeSet<String>>,
    },
    Suggest {
        partial: String,
        limit: usize,
        resp: oneshot::Sender<Vec<String>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `book` onto its own task and returns a handle to it.
///
/// Commands run one at a time in arrival order; each mutation is persisted
/// before its reply is sent.
pub fn spawn_records<B, C>(book: RecordBook<B, C>, config: RuntimeConfig) -> RecordsHandle
where
    B: BlobStore + 'static,
    C: Clock + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<RecordEvent>(config.event_capacity.max(1));

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut book = book;
        info!("event=runtime_start module=runtime records={}", book.len());

        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &mut book, &events_tx_loop) {
                break;
            }
        }

        info!("event=runtime_stop module=runtime records={}", book.len());
    });

    RecordsHandle { cmd_tx, events_tx }
}

impl RecordsHandle {
    /// Receives events for mutations applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.events_tx.subscribe()
    }

    /// Creates a record from `tags`.
    pub async fn create(&self, tags: Vec<String>) -> Result<Record, RuntimeError> {
        self.call(|resp| Command::Create { tags, resp }).await?
    }

    /// Replaces the tags of `id`; `false` when absent.
    pub async fn update(&self, id: RecordId, tags: Vec<String>) -> Result<bool, RuntimeError> {
        self.call(|resp| Command::Update { id, tags, resp }).await?
    }

    /// Deletes `id`; `false` when absent.
    pub async fn delete(&self, id: RecordId) -> Result<bool, RuntimeError> {
        self.call(|resp| Command::Delete { id, resp }).await?
    }

    /// Replaces the collection from an export payload.
    pub async fn import_json(&self, text: impl Into<String>) -> Result<usize, RuntimeError> {
        let text = text.into();
        self.call(|resp| Command::Import { text, resp }).await?
    }

    /// Pretty-printed export payload.
    pub async fn export_json(&self) -> Result<String, RuntimeError> {
        self.call(|resp| Command::Export { resp }).await?
    }

    /// Record with `id`, if present.
    pub async fn get(&self, id: RecordId) -> Result<Option<Record>, RuntimeError> {
        self.call(|resp| Command::Get { id, resp }).await
    }

    /// Every record in store order.
    pub async fn list(&self) -> Result<Vec<Record>, RuntimeError> {
        self.call(|resp| Command::List { resp }).await
    }

    /// Records matching `query`.
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<Record>, RuntimeError> {
        let query = query.into();
        self.call(|resp| Command::Search { query, resp }).await
    }

    /// Tag counts for `query`.
    pub async fn frequencies(&self, query: impl Into<String>) -> Result<Vec<TagFrequency>, RuntimeError> {
        let query = query.into();
        self.call(|resp| Command::Frequencies { query, resp }).await
    }

    /// Every distinct tag.
    pub async fn universe(&self) -> Result<BTreeSet<String>, RuntimeError> {
        self.call(|resp| Command::Universe { resp }).await
    }

    /// Completions for a partially typed tag.
    pub async fn suggest(&self, partial: impl Into<String>, limit: usize) -> Result<Vec<String>, RuntimeError> {
        let partial = partial.into();
        self.call(|resp| Command::Suggest {
            partial,
            limit,
            resp,
        })
        .await
    }

    /// Stops the runtime after earlier commands finish.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command<B: BlobStore, C: Clock>(
    cmd: Command,
    book: &mut RecordBook<B, C>,
    events_tx: &broadcast::Sender<RecordEvent>,
) -> bool {
    match cmd {
        Command::Create { tags, resp } => {
            let res = book.create(tags).map_err(RuntimeError::from);
            if let Ok(rec) = &res {
                let _ = events_tx.send(RecordEvent::Created { id: rec.id });
            }
            let _ = resp.send(res);
        }
        Command::Update { id, tags, resp } => {
            let res = book.update(id, tags).map_err(RuntimeError::from);
            if let Ok(true) = res {
                let _ = events_tx.send(RecordEvent::Updated { id });
            }
            let _ = resp.send(res);
        }
        Command::Delete { id, resp } => {
            let res = book.delete(id).map_err(RuntimeError::from);
            if let Ok(true) = res {
                let _ = events_tx.send(RecordEvent::Deleted { id });
            }
            let _ = resp.send(res);
        }
        Command::Import { text, resp } => {
            let res = book.import_json(&text).map_err(RuntimeError::from);
            if let Ok(count) = res {
                let _ = events_tx.send(RecordEvent::Imported { count });
            }
            let _ = resp.send(res);
        }
        Command::Export { resp } => {
            let _ = resp.send(book.export_json().map_err(RuntimeError::from));
        }
        Command::Get { id, resp } => {
            let _ = resp.send(book.get(id).cloned());
        }
        Command::List { resp } => {
            let _ = resp.send(book.list());
        }
        Command::Search { query, resp } => {
            let _ = resp.send(book.search(&query));
        }
        Command::Frequencies { query, resp } => {
            let _ = resp.send(book.frequencies(&query));
        }
        Command::Universe { resp } => {
            let _ = resp.send(book.universe());
        }
        Command::Suggest {
            partial,
            limit,
            resp,
        } => {
            let _ = resp.send(book.suggest(&partial, limit));
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }
    false
}
