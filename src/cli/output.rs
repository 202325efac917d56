//! Output formatting for CLI

use crate::pipeline::TrainingStats;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a fraction as a percentage with one decimal
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, &str)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print win/loss/draw counts with rates
pub fn print_outcomes(stats: &TrainingStats) {
    let games = format_number(stats.total_games);
    let wins = format!("{} ({})", format_number(stats.wins), format_percent(stats.win_rate()));
    let losses = format!(
        "{} ({})",
        format_number(stats.losses),
        format_percent(stats.loss_rate())
    );
    let draws = format!(
        "{} ({})",
        format_number(stats.draws),
        format_percent(stats.draw_rate())
    );
    let game_time = format!("{:.2}s", stats.average_game_time);

    print_stats_table(&[
        ("Games", &games),
        ("Wins", &wins),
        ("Losses", &losses),
        ("Draws", &draws),
        ("Average game time", &game_time),
    ]);
}
