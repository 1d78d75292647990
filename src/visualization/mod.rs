mod charts;
mod tables;

pub use charts::{format_temperature_trend, print_temperature_trend};
pub use tables::{
    format_cells_table, format_projection_table, format_summary_table, print_cells_table,
    print_projection_table, print_summary_table,
};
