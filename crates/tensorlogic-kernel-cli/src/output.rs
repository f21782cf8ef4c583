//! Colored output formatting for the kernel CLI

use colored::*;

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_value(value: f64) {
    println!("{:.6}", value);
}

pub fn format_matrix(matrix: &[Vec<f64>]) -> String {
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| format!("{:.6}", value))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn enable_colors(enabled: bool) {
    colored::control::set_override(enabled);
}
