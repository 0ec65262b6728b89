use crate::catalog::visibility::FilterCriteria;
use crate::prelude::{SessionTag, TransportError};
use crate::session::controller::{SessionState, StreamSessionController};
use crate::session::observer::SessionObserver;
use crate::session::params::SessionParameters;
use crate::session::transport::{ChunkSource, Transport};
use crate::telemetry::log::LogManager;
use std::rc::Rc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Requests from the UI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Enter(SessionParameters),
    Restart(SessionParameters),
    Exit,
    SetCriteria(FilterCriteria),
    SetCapacity(usize),
    Shutdown,
}

enum ReaderEvent {
    Opened,
    Chunk(Vec<u8>),
    Ended,
    Failed(TransportError),
}

struct TaggedEvent {
    tag: SessionTag,
    event: ReaderEvent,
}

struct ReaderHandle {
    tag: SessionTag,
    abort: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Runs a [`StreamSessionController`] against a [`Transport`].
///
/// The driver task is the only writer of the cache. Transport reads happen in a
/// separate local task that forwards tagged chunks, so a read already in flight when
/// a session stops is filtered out by its tag. Must run inside a
/// [`tokio::task::LocalSet`].
pub struct SessionDriver<T, O> {
    controller: StreamSessionController<O>,
    transport: Rc<T>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<TaggedEvent>,
    events_rx: mpsc::UnboundedReceiver<TaggedEvent>,
    reader: Option<ReaderHandle>,
    logger: LogManager,
}

impl<T, O> SessionDriver<T, O>
where
    T: Transport + 'static,
    O: SessionObserver,
{
    pub fn new(
        controller: StreamSessionController<O>,
        transport: T,
        commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            transport: Rc::new(transport),
            commands,
            events_tx,
            events_rx,
            reader: None,
            logger: LogManager::new("driver"),
        }
    }

    /// Processes commands and transport events until `Shutdown` (or every command
    /// sender is dropped), then hands the controller back.
    pub async fn run(mut self) -> StreamSessionController<O> {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                Some(tagged) = self.events_rx.recv() => self.handle_event(tagged).await,
            }
        }

        self.shutdown().await;
        self.controller
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Enter(params) => match self.controller.enter_live(params) {
                Ok(tag) => self.spawn_reader(tag, params),
                Err(err) => self.logger.diagnostic(&err.to_string()),
            },
            SessionCommand::Restart(params) => match self.controller.request_restart(params) {
                Ok(()) => self.complete_stop().await,
                Err(err) => self.logger.diagnostic(&err.to_string()),
            },
            SessionCommand::Exit => match self.controller.request_exit() {
                Ok(()) => self.complete_stop().await,
                Err(err) => self.logger.diagnostic(&err.to_string()),
            },
            SessionCommand::SetCriteria(criteria) => {
                self.controller.set_criteria(criteria);
            }
            SessionCommand::SetCapacity(capacity) => {
                self.controller.set_capacity(capacity);
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn handle_event(&mut self, tagged: TaggedEvent) {
        let TaggedEvent { tag, event } = tagged;
        match event {
            ReaderEvent::Opened => {
                self.controller.stream_opened(tag);
            }
            ReaderEvent::Chunk(chunk) => {
                self.controller.apply_chunk(tag, &chunk);
            }
            ReaderEvent::Ended => {
                if self.controller.stream_ended(tag) {
                    self.complete_stop().await;
                }
            }
            ReaderEvent::Failed(error) => {
                if self.controller.transport_failed(tag, error) {
                    self.complete_stop().await;
                }
            }
        }
    }

    /// Cancels the in-flight read, waits for the reader to acknowledge, and completes
    /// the `Stopping` transition.
    async fn complete_stop(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.abort.send(());
            if let Err(err) = reader.task.await {
                self.logger
                    .diagnostic(&format!("reader for {} ended abnormally: {}", reader.tag, err));
            }
        }

        match self.controller.acknowledge_stopped() {
            Ok(Some((tag, params))) => self.spawn_reader(tag, params),
            Ok(None) => {}
            Err(err) => self.logger.diagnostic(&err.to_string()),
        }
    }

    async fn shutdown(&mut self) {
        match self.controller.state() {
            SessionState::Starting | SessionState::Live => {
                if self.controller.request_exit().is_ok() {
                    self.complete_stop().await;
                }
            }
            SessionState::Stopping => self.complete_stop().await,
            SessionState::Idle => {}
        }
    }

    fn spawn_reader(&mut self, tag: SessionTag, params: SessionParameters) {
        let (abort, aborted) = oneshot::channel();
        let transport = Rc::clone(&self.transport);
        let events = self.events_tx.clone();
        let task = tokio::task::spawn_local(async move {
            tokio::select! {
                _ = aborted => {}
                _ = pump(transport, params, tag, events) => {}
            }
        });
        self.reader = Some(ReaderHandle { tag, abort, task });
    }
}

async fn pump<T: Transport>(
    transport: Rc<T>,
    params: SessionParameters,
    tag: SessionTag,
    events: mpsc::UnboundedSender<TaggedEvent>,
) {
    let emit = |event| events.send(TaggedEvent { tag, event }).is_ok();

    let mut source = match transport.open(&params).await {
        Ok(source) => source,
        Err(err) => {
            emit(ReaderEvent::Failed(err));
            return;
        }
    };
    if !emit(ReaderEvent::Opened) {
        return;
    }

    loop {
        let event = match source.next_chunk().await {
            Ok(Some(chunk)) => ReaderEvent::Chunk(chunk),
            Ok(None) => {
                emit(ReaderEvent::Ended);
                return;
            }
            Err(err) => {
                emit(ReaderEvent::Failed(err));
                return;
            }
        };
        if !emit(event) {
            return;
        }
    }
}
