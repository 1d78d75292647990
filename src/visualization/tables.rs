use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table,
};

use crate::models::{CellId, ProjectionSummary, TreeCohortState, YearlyProjection};

/// Format the year-by-year projection table as a string.
pub fn format_projection_table(yearly: &[YearlyProjection]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Yearly Projection".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Year",
            "Trees",
            "Avg DBH (cm)",
            "Survival",
            "Temp (°F)",
            "CO₂ (kg/yr)",
            "PM2.5 (lbs/yr)",
        ]);

    for y in yearly {
        table.add_row(vec![
            Cell::new(format!("{}", y.year)),
            Cell::new(format!("{:.1}", y.tree_count)),
            Cell::new(format!("{:.1}", y.avg_diameter_cm)),
            Cell::new(format!("{:.1}%", y.survival_rate * 100.0)),
            Cell::new(format!("{:+.3}", y.temperature_reduction_f)),
            Cell::new(format!("{:.1}", y.co2_sequestration_kg_per_year)),
            Cell::new(format!("{:.2}", y.pm25_reduction_lbs_per_year)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the year-by-year projection table.
pub fn print_projection_table(yearly: &[YearlyProjection]) {
    print!("{}", format_projection_table(yearly));
}

/// Format the projection summary table as a string.
pub fn format_summary_table(summary: &ProjectionSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Projection Summary".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value", "Unit"]);

    table.add_row(vec![
        Cell::new("Horizon"),
        Cell::new(format!("{}", summary.years)),
        Cell::new("years"),
    ]);
    table.add_row(vec![
        Cell::new("Final Tree Count"),
        Cell::new(format!("{:.1}", summary.final_tree_count)),
        Cell::new("trees"),
    ]);
    table.add_row(vec![
        Cell::new("Cumulative CO₂"),
        Cell::new(format!("{:.1}", summary.cumulative_co2_kg)),
        Cell::new("kg"),
    ]);
    table.add_row(vec![
        Cell::new("Avg Temperature Change"),
        Cell::new(format!("{:+.3}", summary.avg_temperature_reduction_f)),
        Cell::new("°F"),
    ]);
    table.add_row(vec![
        Cell::new("Total PM2.5 Removed"),
        Cell::new(format!("{:.1}", summary.total_pm25_lbs)),
        Cell::new("lbs"),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print the projection summary table.
pub fn print_summary_table(summary: &ProjectionSummary) {
    print!("{}", format_summary_table(summary));
}

/// Format the known-cells listing as a string.
pub fn format_cells_table(cells: &[(CellId, TreeCohortState)]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Known Cells".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Cell", "Trees", "Avg DBH (cm)", "Dominant Species", "Health"]);

    for (id, state) in cells {
        table.add_row(vec![
            Cell::new(id.as_str()),
            Cell::new(format!("{}", state.tree_count)),
            Cell::new(format!("{:.1}", state.avg_diameter_cm)),
            Cell::new(state.dominant_species().unwrap_or("-")),
            Cell::new(state.dominant_health().to_string()),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the known-cells listing.
pub fn print_cells_table(cells: &[(CellId, TreeCohortState)]) {
    print!("{}", format_cells_table(cells));
}
