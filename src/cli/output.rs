//! Terminal rendering for the dashboard, offer listings and status banners

use crate::analytics::{DashboardSnapshot, StatusLevel, StatusMessage};
use crate::core::{KpiSet, OfferRecord, TrendMetric};
use colored::Colorize;
use prettytable::{format, row, Table};

fn table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

pub fn print_status(message: &StatusMessage) {
    match message.level {
        StatusLevel::Success => println!("{} {}", "✓".green(), message.text.green()),
        StatusLevel::Info => println!("{} {}", "ℹ".blue(), message.text),
        StatusLevel::Error => eprintln!("{} {}", "✗".red(), message.text.red()),
    }
}

pub fn print_success(text: &str) {
    println!("{} {}", "✓".green(), text);
}

/// A failed KPI fetch leaves zeroed counts, which are still shown
fn kpi_table(kpis: &KpiSet) -> Table {
    let mut table = table();
    table.set_titles(row![b->"Users", b->"Offers", b->"Redemptions"]);
    table.add_row(row![kpis.users, kpis.offers, kpis.redemptions]);
    table
}

pub fn render_dashboard(snapshot: &DashboardSnapshot) {
    println!("{}", "Reward360 Analytics".bold());
    println!(
        "{}",
        format!("Generated {}", snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    println!();

    kpi_table(&snapshot.kpis).printstd();
    if let Some(message) = &snapshot.kpi_error {
        eprintln!("{} {}", "✗".red(), "Failed to load analytics data.".red());
        eprintln!("  {}", message.dimmed());
    }
    println!();

    println!("{}", "Trends".bold());
    for metric in TrendMetric::ALL {
        let series = snapshot.trends.get(metric);
        if series.is_empty() {
            println!("  {:<12} {}", metric.to_string().cyan(), "no data".dimmed());
            continue;
        }
        let points: Vec<String> = series
            .labels()
            .iter()
            .zip(series.data())
            .map(|(label, value)| format!("{}={}", label, value))
            .collect();
        println!("  {:<12} {}", metric.to_string().cyan(), points.join("  "));
    }
    println!();

    println!("{}", "Offers by category".bold());
    let chart = snapshot.category_chart();
    let total = snapshot.categories.total();
    let mut categories = table();
    categories.set_titles(row![b->"Category", b->"Offers", b->"Share"]);
    for (label, count) in chart.labels.iter().zip(&chart.data) {
        let share = if total == 0 {
            "-".to_string()
        } else {
            format!("{:.0}%", *count as f64 * 100.0 / total as f64)
        };
        categories.add_row(row![label, count, share]);
    }
    categories.printstd();
    println!();

    println!("{}", "Top redeemed offers".bold());
    if snapshot.top_offers.is_empty() {
        println!("  {}", "No redemptions yet".dimmed());
    } else {
        let mut top = table();
        top.set_titles(row![b->"#", b->"Offer", b->"Redemptions"]);
        for entry in &snapshot.top_offers {
            top.add_row(row![entry.rank, entry.title, entry.count]);
        }
        top.printstd();
    }

    if !snapshot.failures.is_empty() {
        println!();
        for failure in &snapshot.failures {
            println!(
                "{} {} unavailable: {}",
                "⚠".yellow(),
                failure.origin.yellow(),
                failure.message.dimmed()
            );
        }
    }
}

pub fn render_offers(offers: &[OfferRecord]) {
    if offers.is_empty() {
        println!("{}", "No offers found".dimmed());
        return;
    }

    let mut listing = table();
    listing.set_titles(row![
        b->"ID",
        b->"Title",
        b->"Category",
        b->"Points",
        b->"Status",
        b->"Tier"
    ]);
    for offer in offers {
        let status = match offer.active {
            Some(true) => "published".green().to_string(),
            Some(false) => "hidden".dimmed().to_string(),
            None => "-".to_string(),
        };
        let id = offer.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        let points = offer
            .cost_points
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        listing.add_row(row![
            id,
            offer.title.as_deref().unwrap_or("-"),
            offer.category.as_deref().unwrap_or("All"),
            points,
            status,
            offer.tier_level.as_deref().unwrap_or("All")
        ]);
    }
    listing.printstd();
    println!("{} offers", offers.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_utils::{populated_source, Call};
    use crate::analytics::MetricsAggregator;
    use std::sync::Arc;

    fn cells(table: &Table) -> Vec<String> {
        table
            .get_row(0)
            .map(|row| row.iter().map(|cell| cell.get_content()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_failed_kpis_still_render_zeroed_cards() {
        let source = Arc::new(populated_source().failing(Call::Kpis));
        let snapshot = MetricsAggregator::new(source, 5).aggregate().await;
        assert!(snapshot.kpi_error.is_some());

        assert_eq!(cells(&kpi_table(&snapshot.kpis)), vec!["0", "0", "0"]);
        render_dashboard(&snapshot);
    }

    #[test]
    fn test_kpi_table_shows_counts() {
        let kpis = KpiSet {
            users: 120,
            offers: 14,
            redemptions: 87,
        };
        assert_eq!(cells(&kpi_table(&kpis)), vec!["120", "14", "87"]);
    }
}
