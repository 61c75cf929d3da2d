/// A sink for human-readable progress messages.
///
/// Messages are observational only: fire-and-forget, no backpressure, and a
/// run behaves identically whether anything listens or not.
pub trait Ui {
    fn say(&self, message: &str);
}

/// Forwards every message to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn say(&self, message: &str) {
        tracing::info!("{message}");
    }
}

impl<F: Fn(&str)> Ui for F {
    fn say(&self, message: &str) {
        self(message);
    }
}
