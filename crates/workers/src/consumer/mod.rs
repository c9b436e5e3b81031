mod connection;
mod consumer_loop;
mod handler;

pub use connection::{connect_jetstream, create_pull_consumer, ensure_stream};
pub use consumer_loop::{disposition, ConsumerLoop, Disposition, REDELIVERY_DELAY};
pub use handler::{decode_message, decode_samples, DecodeError};
