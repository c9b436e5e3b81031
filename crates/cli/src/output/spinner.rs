use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn create(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]);
    sp.set_style(style);
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

pub fn finish_clear(sp: &ProgressBar) {
    sp.finish_and_clear();
}
