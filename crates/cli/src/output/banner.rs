use colored::Colorize;

const LOGO: &[&str] = &[
    r"   ███████╗██╗     ███████╗███████╗████████╗",
    r"   ██╔════╝██║     ██╔════╝██╔════╝╚══██╔══╝",
    r"   █████╗  ██║     █████╗  █████╗     ██║   ",
    r"   ██╔══╝  ██║     ██╔══╝  ██╔══╝     ██║   ",
    r"   ██║     ███████╗███████╗███████╗   ██║   ",
    r"   ╚═╝     ╚══════╝╚══════╝╚══════╝   ╚═╝   ",
    r"      ░░ FleetWatch · robot fleet alerts ░░ ",
];

pub fn print_banner() {
    let colors = [
        colored::Color::Cyan,
        colored::Color::Cyan,
        colored::Color::BrightCyan,
        colored::Color::BrightCyan,
        colored::Color::Cyan,
        colored::Color::Cyan,
        colored::Color::BrightWhite,
    ];

    for (line, &color) in LOGO.iter().zip(colors.iter()) {
        println!("{}", line.color(color).bold());
    }
}

pub fn print_version_block(version: &str, server: &str) {
    print_banner();
    println!();
    println!("  {} {}", "Version".dimmed(), version.bright_cyan().bold());
    println!("  {} {}", " Server".dimmed(), server.bright_white());
    println!();
}
