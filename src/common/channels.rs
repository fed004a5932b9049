//! Channel type definitions for inter-task communication

use tokio::sync::watch;

/// Sender half of the cooperative stop signal
pub type ShutdownSender = watch::Sender<bool>;

/// Receiver half of the cooperative stop signal, checked between cycles
pub type ShutdownReceiver = watch::Receiver<bool>;

/// Create a new shutdown channel, initially not signalled
pub fn create_shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/// Whether a stop was requested on this receiver
pub fn is_shutdown(receiver: &ShutdownReceiver) -> bool {
    *receiver.borrow()
}
