use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::license::classifier::UNKNOWN;
use crate::models::ResolvedPackage;

/// Print resolved packages as a table.
pub fn render(resolved: &[ResolvedPackage]) {
    println!(
        "\n {} v{}\n",
        "license-ripper".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", build_table(resolved));
    println!(" {} packages\n", resolved.len());
}

fn build_table(resolved: &[ResolvedPackage]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Sources").add_attribute(Attribute::Bold),
        ]);

    for package in resolved {
        let color = if package.license_expression.contains(UNKNOWN) {
            Color::Red
        } else if package.resolved_from_text() {
            Color::Yellow
        } else {
            Color::Green
        };

        let sources: Vec<String> = package
            .licenses
            .iter()
            .map(|license| license.source.to_string())
            .collect();

        table.add_row(vec![
            Cell::new(&package.name),
            Cell::new(&package.version),
            Cell::new(&package.license_expression).fg(color),
            Cell::new(sources.join(", ")),
        ]);
    }

    table
}
