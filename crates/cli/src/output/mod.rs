pub mod banner;
pub mod confirm;
pub mod format;
pub mod spinner;
pub mod table;
pub mod theme;

pub use format::{format_timestamp, print_error, print_json, print_success, OutputMode};
