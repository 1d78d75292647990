use colored::Colorize;

use crate::models::YearlyProjection;

/// Format a text-based chart of the temperature trajectory as a string.
///
/// Cooling years draw green bars to the right of the axis; net-warming
/// years draw red bars to the left.
pub fn format_temperature_trend(yearly: &[YearlyProjection]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Temperature Trend".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if yearly.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let max_abs = yearly
        .iter()
        .map(|y| y.temperature_reduction_f.abs())
        .fold(0.0f64, f64::max);

    let half_width = 24;

    output.push_str(&format!("  {:>4}  {:>8}  Trend\n", "Year", "°F"));
    output.push_str(&format!("  {}\n", "-".repeat(56)));

    for y in yearly {
        let bar_len = if max_abs > 0.0 {
            ((y.temperature_reduction_f.abs() / max_abs) * half_width as f64).round() as usize
        } else {
            0
        };
        let bar = "\u{2588}".repeat(bar_len);

        let line = if y.temperature_reduction_f < 0.0 {
            format!(
                "  {:>4}  {:>8.3}  {}{}|",
                y.year,
                y.temperature_reduction_f,
                " ".repeat(half_width - bar_len),
                bar.red(),
            )
        } else {
            format!(
                "  {:>4}  {:>8.3}  {}|{}",
                y.year,
                y.temperature_reduction_f,
                " ".repeat(half_width),
                bar.green(),
            )
        };
        output.push_str(&line);
        output.push('\n');
    }

    output.push('\n');
    output
}

/// Print a text-based chart of the temperature trajectory.
pub fn print_temperature_trend(yearly: &[YearlyProjection]) {
    print!("{}", format_temperature_trend(yearly));
}
