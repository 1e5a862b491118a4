//! Terminal output helpers shared by the commands

use colored::*;

/// Print an info box with bullet items
pub fn info_box(title: &str, items: &[&str]) {
    eprintln!("\n{} {}", "ℹ".cyan(), title.bold());
    for item in items {
        eprintln!("  {} {}", "•".dimmed(), item);
    }
}

pub fn print_warning(message: &str) {
    eprintln!(
        "\n{} {}",
        "⚠".yellow(),
        format!("Warning: {}", message).yellow()
    );
}

pub fn print_error(message: &str) {
    eprintln!("\n{} {}", "✗".red(), format!("Error: {}", message).red());
}

pub fn print_success(message: &str) {
    eprintln!("\n{} {}", "✓".green().bold(), message);
}

pub fn print_tip(message: &str) {
    eprintln!("\n{} {}", "→".cyan(), format!("Tip: {}", message).dimmed());
}

pub fn print_section(title: &str) {
    println!("\n{} {}", "▶".cyan(), title.bold());
    println!("{}", "─".repeat(60).dimmed());
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
