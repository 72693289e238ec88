mod sender;
mod transport;

#[cfg(test)]
mod tests;

pub use sender::{FAULT_BACKOFF, run_sender};
pub use transport::{
    HttpTransport, NO_MESSAGE_PLACEHOLDER, SendOutcome, Transport, TransportSettings,
};
