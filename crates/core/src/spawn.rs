use log::error;
use std::thread;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Fire-and-forget task launcher. No handle is returned; results travel over
/// the event bus.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, name: &str, task: Task);
}

/// Runs every task on its own OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner;

impl TaskSpawner for ThreadSpawner {
    fn spawn(&self, name: &str, task: Task) {
        if let Err(err) = thread::Builder::new().name(name.to_string()).spawn(task) {
            error!("failed to spawn {name}: {err}");
        }
    }
}

/// Runs tasks on the caller's thread before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, _name: &str, task: Task) {
        task();
    }
}
