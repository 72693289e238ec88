use tokio::sync::broadcast;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

const SHUTDOWN_CHANNEL_CAPACITY: usize = 16;

/// Creates a fresh shutdown channel for one run. Workers subscribe from the
/// sender, so late receivers (interactive growth) still share the signal.
#[must_use]
pub fn channel() -> ShutdownSender {
    broadcast::channel(SHUTDOWN_CHANNEL_CAPACITY).0
}
