//! UI loop: owns the surface tree, the layout grid, the dispatcher and the
//! executor, and is the only place any of them is mutated.
//!
//! Each iteration drains whatever input is already queued, polls the music
//! service for changes, repaints if something changed and issues a full
//! refresh on a fixed cadence. It then parks on the input queue for at most
//! one frame interval.

use anyhow::Result;
use core_actions::{CommandExecutor, DispatchResult, Effect, ModalDispatcher, ServiceExecutor};
use core_config::{LayoutConfig, RenderConfig};
use core_events::{
    InputEvent, KEYPRESS_TOTAL, KEYPRESS_UNMAPPED, QUEUE_BUFFERED, QUEUE_DIRECT_HANDOFFS,
    QUEUE_ENQUEUED,
};
use core_input::{AsyncInputShutdown, InputQueue};
use core_keymap::KeyMap;
use core_model::SurfaceTree;
use core_render::{LayoutGrid, RenderContext, Screen};
use core_state::MusicService;
use core_terminal::TerminalBackend;
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownReason {
    CommandQuit,
    ActionQuit,
    BackendError,
}

impl ShutdownReason {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CommandQuit => "command_quit",
            ShutdownReason::ActionQuit => "action_quit",
            ShutdownReason::BackendError => "backend_error",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

/// Where a command line came from; only matters for the quit reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Command,
    Action,
}

pub(crate) struct UiRuntime<'a, S: MusicService> {
    backend: &'a mut dyn TerminalBackend,
    tree: SurfaceTree,
    grid: LayoutGrid,
    dispatcher: ModalDispatcher,
    executor: ServiceExecutor<S>,
    queue: InputQueue<InputEvent>,
    render: RenderConfig,
    running: bool,
    shutdown_reason: Option<ShutdownReason>,
    dirty: bool,
    force_refresh: bool,
    last_revision: u64,
    last_tick: Instant,
    last_refresh: Instant,
    input_task: Option<JoinHandle<()>>,
    input_shutdown: Option<AsyncInputShutdown>,
}

impl<'a, S: MusicService> UiRuntime<'a, S> {
    /// Build the grid for the backend's current size and paint it once.
    pub(crate) fn new(
        backend: &'a mut dyn TerminalBackend,
        layout: &LayoutConfig,
        render: RenderConfig,
        keymap: KeyMap,
        service: S,
        queue: InputQueue<InputEvent>,
    ) -> Result<Self> {
        let mut tree = SurfaceTree::new(&*backend);
        let grid = {
            let mut screen = Screen::new(&mut tree, &mut *backend);
            LayoutGrid::build(layout, &mut screen)?
        };
        let last_revision = service.revision();
        let now = Instant::now();
        let mut runtime = Self {
            backend,
            tree,
            grid,
            dispatcher: ModalDispatcher::new(keymap),
            executor: ServiceExecutor::new(service),
            queue,
            render,
            running: true,
            shutdown_reason: None,
            dirty: true,
            force_refresh: true,
            last_revision,
            last_tick: now,
            last_refresh: now,
            input_task: None,
            input_shutdown: None,
        };
        let (width, height) = runtime.backend.screen_size();
        runtime.relayout(width, height);
        Ok(runtime)
    }

    /// Hand over the producer task so shutdown can stop and join it.
    pub(crate) fn attach_input(&mut self, task: JoinHandle<()>, shutdown: AsyncInputShutdown) {
        self.input_task = Some(task);
        self.input_shutdown = Some(shutdown);
    }

    pub(crate) async fn run(&mut self) -> Result<ShutdownReason> {
        let span = tracing::debug_span!(target: "runtime", "ui_loop");
        let _enter = span.enter();
        info!(target: "runtime", "ui_loop_started");

        let mut failure = None;
        while self.running {
            if let Err(err) = self.step() {
                error!(target: "runtime", ?err, "backend_write_failed");
                self.stop(ShutdownReason::BackendError);
                failure = Some(err);
                break;
            }
            if !self.running {
                break;
            }
            let queue = self.queue.clone();
            let wait = self.render.frame_interval();
            let next = tokio::select! {
                event = queue.dequeue() => Some(event),
                _ = tokio::time::sleep(wait) => None,
            };
            if let Some(event) = next {
                self.handle_event(event);
            }
        }

        let reason = self.shutdown_reason.unwrap_or(ShutdownReason::CommandQuit);
        self.finalize_shutdown(reason).await;
        match failure {
            Some(err) => Err(err),
            None => Ok(reason),
        }
    }

    /// One non-blocking pass: drain input, poll the service, flush.
    pub(crate) fn step(&mut self) -> Result<()> {
        while self.running {
            let Some(event) = self.queue.try_dequeue() else {
                break;
            };
            self.handle_event(event);
        }
        self.poll_service();
        self.present(Instant::now())
    }

    pub(crate) fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => match self.dispatcher.handle(&key) {
                DispatchResult::Ignored => {}
                DispatchResult::Redraw => self.dirty = true,
                DispatchResult::Submit(line) => self.execute(&line, Origin::Command),
                DispatchResult::Action(line) => self.execute(&line, Origin::Action),
            },
            InputEvent::Resize(width, height) => {
                self.relayout(u32::from(width), u32::from(height));
            }
            InputEvent::FocusGained | InputEvent::FocusLost => {
                self.force_refresh = true;
            }
        }
    }

    fn execute(&mut self, line: &str, origin: Origin) {
        trace!(target: "runtime", origin = ?origin, len = line.len(), "execute");
        let outcome = self.executor.execute(line);
        if outcome.status.is_some() || origin == Origin::Command {
            self.dispatcher.set_last_output(outcome.status);
        }
        self.dirty = true;
        match outcome.effect {
            Effect::None => {}
            Effect::Quit => self.stop(match origin {
                Origin::Command => ShutdownReason::CommandQuit,
                Origin::Action => ShutdownReason::ActionQuit,
            }),
            Effect::OpenDetail { kind, index } => {
                let mut screen = Screen::new(&mut self.tree, &mut *self.backend);
                if let Err(err) = self.grid.open_detail(&mut screen, kind, index) {
                    warn!(target: "runtime", %err, "detail_open_failed");
                    self.dispatcher.set_last_output(Some(err.to_string()));
                }
            }
            Effect::CloseDetail => {
                let mut screen = Screen::new(&mut self.tree, &mut *self.backend);
                self.grid.close_detail(&mut screen);
            }
        }
    }

    fn stop(&mut self, reason: ShutdownReason) {
        info!(target: "runtime", reason = reason.as_str(), "stop_requested");
        self.running = false;
        if self.shutdown_reason.is_none() {
            self.shutdown_reason = Some(reason);
        }
    }

    /// Re-flow every page for a new terminal size.
    fn relayout(&mut self, width: u32, height: u32) {
        let Self {
            backend,
            tree,
            grid,
            dispatcher,
            executor,
            ..
        } = self;
        let line = dispatcher.buffer().text();
        let ctx = render_context(dispatcher, &line, executor.service());
        let mut screen = Screen::new(tree, &mut **backend);
        grid.resize(&mut screen, width, height, &ctx);
        self.dirty = true;
        debug!(target: "runtime", width, height, "relayout");
    }

    fn poll_service(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.executor.service_mut().tick(elapsed);
        let revision = self.executor.service().revision();
        if revision != self.last_revision {
            self.last_revision = revision;
            self.dirty = true;
        }
    }

    /// Repaint when dirty; full refresh when forced or the refresh interval
    /// has passed.
    fn present(&mut self, now: Instant) -> Result<()> {
        if self.dirty {
            let Self {
                backend,
                tree,
                grid,
                dispatcher,
                executor,
                ..
            } = self;
            let line = dispatcher.buffer().text();
            let ctx = render_context(dispatcher, &line, executor.service());
            let mut screen = Screen::new(tree, &mut **backend);
            grid.render_all(&mut screen, &ctx);
            self.backend.render()?;
            self.dirty = false;
        }
        let due =
            now.saturating_duration_since(self.last_refresh) >= self.render.refresh_interval();
        if self.force_refresh || due {
            self.backend.refresh()?;
            self.force_refresh = false;
            self.last_refresh = now;
        }
        Ok(())
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        {
            let mut screen = Screen::new(&mut self.tree, &mut *self.backend);
            self.grid.close_detail(&mut screen);
        }

        if let Some(shutdown) = self.input_shutdown.take() {
            trace!(
                target: "runtime.shutdown",
                reason = reason.as_str(),
                "input_task_shutdown_signal"
            );
            shutdown.signal();
        }

        if let Some(handle) = self.input_task.take() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(())) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_timeout"
                ),
            }
        }

        info!(
            target: "runtime.shutdown",
            enqueued = QUEUE_ENQUEUED.load(Ordering::Relaxed),
            handoffs = QUEUE_DIRECT_HANDOFFS.load(Ordering::Relaxed),
            buffered = QUEUE_BUFFERED.load(Ordering::Relaxed),
            keys = KEYPRESS_TOTAL.load(Ordering::Relaxed),
            unmapped = KEYPRESS_UNMAPPED.load(Ordering::Relaxed),
            "input_telemetry"
        );
        log_shutdown_stage(reason, "complete");
    }

    #[cfg(test)]
    fn screen_text(&self) -> Vec<String> {
        self.backend.planes().compose()
    }
}

fn render_context<'r>(
    dispatcher: &'r ModalDispatcher,
    command_line: &'r str,
    service: &'r dyn MusicService,
) -> RenderContext<'r> {
    RenderContext {
        service,
        mode: dispatcher.mode(),
        command_line,
        cursor: dispatcher.buffer().cursor(),
        status: dispatcher.last_output(),
    }
}
