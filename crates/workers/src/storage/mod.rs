mod retry;
mod writer;

pub use retry::{write_with_retry, WriteError};
pub use writer::{SampleStore, SampleWriter};
