//! Keyboard input pipeline: the async FIFO queue and the producer task that
//! fills it from the terminal.

mod async_service;
mod key_token;
mod queue;

pub use async_service::AsyncInputShutdown;
pub use queue::InputQueue;

use async_service::spawn_async_event_task;
use core_events::InputEvent;
use tokio::task::JoinHandle;

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(queue: InputQueue<InputEvent>) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(queue)
}
