use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};

pub fn build_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

pub fn severity_cell(severity: &str) -> Cell {
    let cell = Cell::new(severity);
    match severity {
        "critical" => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        "warning" => cell.fg(Color::Yellow).add_attribute(Attribute::Bold),
        "info" => cell.fg(Color::Cyan),
        _ => cell,
    }
}

pub fn state_cell(state: &str) -> Cell {
    let cell = Cell::new(state);
    match state {
        "open" => cell.fg(Color::Red),
        "acknowledged" => cell.fg(Color::Yellow),
        "resolved" => cell.fg(Color::DarkGrey),
        _ => cell,
    }
}

pub fn enabled_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::DarkGrey)
    }
}
