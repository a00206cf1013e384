mod client;
mod transport;
pub mod wire;

pub use client::{AttemptState, ExtractionClient, backoff_delay, extract_text};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};
