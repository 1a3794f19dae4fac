use crate::key_token::map_key_event;
use crate::queue::InputQueue;
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL, ASYNC_INPUT_STOP_STREAM,
    InputEvent, KEYPRESS_TOTAL,
};
use crossterm::event::{Event as CEvent, EventStream};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    pub(crate) fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn the Tokio task reading `crossterm::EventStream` into `queue`.
pub(crate) fn spawn_async_event_task(
    queue: InputQueue<InputEvent>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let handle = task::spawn(async move {
        let span = tracing::debug_span!(target: "input.thread", "input_async_task");
        let _enter = span.enter();
        AsyncEventStreamTask::new(queue, EventStream::new(), listener)
            .run()
            .await;
    });
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

pub(crate) struct AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    queue: InputQueue<InputEvent>,
    stream: S,
    shutdown: ShutdownListener,
}

impl<S> AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    pub(crate) fn new(
        queue: InputQueue<InputEvent>,
        stream: S,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            queue,
            stream,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
        let mut stream_error = None;
        let reason = loop {
            let maybe_result = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break ExitReason::ShutdownSignal,
                result = self.stream.next() => result,
            };

            let Some(result) = maybe_result else {
                break ExitReason::StreamEnded;
            };

            match result {
                Ok(CEvent::Key(key)) => {
                    if let Some(input) = map_key_event(&key) {
                        trace!(
                            target: "input.event",
                            kind = "key",
                            id = input.id,
                            mods = ?input.mods,
                            text_len = input.utf8.len()
                        );
                        KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
                        self.queue.enqueue(InputEvent::Key(input));
                    }
                }
                Ok(CEvent::Resize(w, h)) => {
                    trace!(target: "input.event", w, h, "resize");
                    self.queue.enqueue(InputEvent::Resize(w, h));
                }
                Ok(CEvent::FocusGained) => self.queue.enqueue(InputEvent::FocusGained),
                Ok(CEvent::FocusLost) => self.queue.enqueue(InputEvent::FocusLost),
                Ok(_) => {}
                Err(err) => {
                    stream_error = Some(err.kind());
                    break ExitReason::StreamError;
                }
            }
        };

        match reason {
            ExitReason::ShutdownSignal => {
                ASYNC_INPUT_STOP_SIGNAL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamEnded => {
                ASYNC_INPUT_STOP_STREAM.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamError => {
                ASYNC_INPUT_STOP_ERROR.fetch_add(1, Ordering::Relaxed);
                warn!(target: "input.thread", error_kind = ?stream_error, "async_input_task_stream_error");
            }
        }

        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyInput, keys};
    use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers};
    use std::sync::Mutex;
    use tokio::sync::Mutex as TokioMutex;
    use tokio::time::{Duration, timeout};
    use tokio_stream::wrappers::UnboundedReceiverStream;
    use tracing::field::{Field, Visit};
    use tracing::{Metadata, Subscriber, subscriber::Interest};
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    static LOG_CAPTURE_GUARD: TokioMutex<()> = TokioMutex::const_new(());

    #[derive(Clone, Default)]
    struct LogCapture {
        events: Arc<Mutex<Vec<CapturedLog>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedLog {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct LogVisitor {
        fields: Vec<(String, String)>,
    }

    impl Visit for LogVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for LogCapture
    where
        S: Subscriber,
    {
        fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
            Interest::always()
        }

        fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
            metadata.target().starts_with("input.")
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = LogVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedLog {
                target: event.metadata().target().to_string(),
                fields: visitor.fields,
            });
        }
    }

    async fn run_scenario(events: Vec<CEvent>) -> Vec<InputEvent> {
        let queue = InputQueue::new();
        let stream = tokio_stream::iter(events.into_iter().map(Ok));
        let (_shutdown, listener) = ShutdownListener::new_pair();
        AsyncEventStreamTask::new(queue.clone(), stream, listener)
            .run()
            .await;
        std::iter::from_fn(|| queue.try_dequeue()).collect()
    }

    fn press(code: CKeyCode) -> CEvent {
        CEvent::Key(CKeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn forwards_key_events_in_order() {
        let outputs = run_scenario(vec![
            press(CKeyCode::Char(':')),
            press(CKeyCode::Char('a')),
            press(CKeyCode::Enter),
        ])
        .await;
        assert_eq!(
            outputs,
            vec![
                InputEvent::Key(KeyInput::char(':')),
                InputEvent::Key(KeyInput::char('a')),
                InputEvent::Key(KeyInput::named(keys::ENTER)),
            ]
        );
    }

    #[tokio::test]
    async fn forwards_resize_and_focus() {
        let outputs = run_scenario(vec![CEvent::Resize(120, 48), CEvent::FocusGained]).await;
        assert_eq!(
            outputs,
            vec![InputEvent::Resize(120, 48), InputEvent::FocusGained]
        );
    }

    #[tokio::test]
    async fn unsupported_keys_are_skipped() {
        let outputs = run_scenario(vec![press(CKeyCode::CapsLock), press(CKeyCode::Esc)]).await;
        assert_eq!(outputs, vec![InputEvent::Key(KeyInput::named(keys::ESC))]);
    }

    #[tokio::test]
    async fn stream_error_stops_task() {
        let base = ASYNC_INPUT_STOP_ERROR.load(Ordering::Relaxed);
        let queue = InputQueue::new();
        let stream = tokio_stream::iter(vec![
            Ok(press(CKeyCode::Char('x'))),
            Err(io::Error::other("boom")),
            Ok(press(CKeyCode::Char('y'))),
        ]);
        let (_shutdown, listener) = ShutdownListener::new_pair();
        AsyncEventStreamTask::new(queue.clone(), stream, listener)
            .run()
            .await;
        assert_eq!(queue.len(), 1, "events after the error are not read");
        assert!(ASYNC_INPUT_STOP_ERROR.load(Ordering::Relaxed) > base);
    }

    #[tokio::test]
    async fn logs_startup_and_shutdown_reason_on_signal() {
        let _log_guard = LOG_CAPTURE_GUARD.lock().await;
        let capture = LogCapture::default();
        let events_handle = capture.events.clone();
        let subscriber = Registry::default().with(capture.with_filter(LevelFilter::TRACE));
        let dispatch = tracing::Dispatch::new(subscriber);
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let base_signal = ASYNC_INPUT_STOP_SIGNAL.load(Ordering::Relaxed);
        let (_event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<io::Result<CEvent>>();
        let stream = UnboundedReceiverStream::new(event_rx);
        let (shutdown, listener) = ShutdownListener::new_pair();
        shutdown.signal();
        AsyncEventStreamTask::new(InputQueue::new(), stream, listener)
            .run()
            .await;

        let logged = events_handle.lock().unwrap();
        let stop_event = logged
            .iter()
            .find(|entry| {
                entry.target == "input.thread"
                    && entry
                        .fields
                        .iter()
                        .any(|(k, v)| k == "message" && v == "async_input_task_stopped")
            })
            .unwrap_or_else(|| panic!("missing stop log, captured: {:?}", *logged));
        let reason = stop_event
            .fields
            .iter()
            .find(|(k, _)| k == "reason")
            .map(|(_, v)| v.trim_matches('"'))
            .unwrap_or_default();
        assert_eq!(reason, "shutdown_signal");
        assert!(ASYNC_INPUT_STOP_SIGNAL.load(Ordering::Relaxed) > base_signal);
    }

    #[tokio::test]
    async fn shutdown_signal_exits_promptly() {
        let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel::<io::Result<CEvent>>();
        let stream = UnboundedReceiverStream::new(event_rx);
        let (shutdown, listener) = ShutdownListener::new_pair();
        let task = tokio::spawn(async move {
            let _keep_alive = event_tx;
            AsyncEventStreamTask::new(InputQueue::new(), stream, listener)
                .run()
                .await;
        });
        shutdown.signal();
        timeout(Duration::from_millis(100), task)
            .await
            .expect("shutdown should resolve promptly")
            .expect("task join failed");
    }
}
