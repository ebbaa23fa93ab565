use std::{collections::BTreeMap, fmt::Display};

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    core::{
        aggregator::{IntervalResult, MarketReport},
        comparator::ProfitComparison,
        market::Market,
        timestamp::Timestamp,
    },
    quantity::{power::Kilowatts, rate::MegawattHourRate},
};

/// Width of the longest bar in characters.
const BAR_WIDTH: u32 = 40;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn right(cell: Cell) -> Cell {
    cell.set_alignment(CellAlignment::Right)
}

fn optional<T: Display>(value: Option<T>) -> Cell {
    value.map_or_else(|| Cell::new("—").add_attribute(Attribute::Dim), Cell::new)
}

pub fn build_intervals_table(report: &MarketReport) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date",
        "Start",
        "End",
        "Price",
        "Hours",
        "Decision",
        "Demand",
        "E-boiler",
        "Gas-boiler",
        "Electric",
        "Gas",
        "All-gas",
    ]);
    for result in &report.intervals {
        table.add_row(vec![
            Cell::new(result.timestamp().format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(result.timestamp().format("%H:%M")),
            Cell::new(result.interval.end().format("%H:%M")).add_attribute(Attribute::Dim),
            right(optional(result.interval.price)).fg(match result.interval.price {
                Some(price) if price.is_negative() => Color::Green,
                _ => Color::Reset,
            }),
            right(Cell::new(result.billed_duration)).add_attribute(Attribute::Dim),
            Cell::new(result.decision).fg(result.decision.color()),
            right(Cell::new(result.demand)),
            right(Cell::new(result.electric_power)),
            right(Cell::new(result.gas_power)),
            right(Cell::new(result.electric_cost)),
            right(Cell::new(result.gas_cost)),
            right(Cell::new(result.counterfactual_cost)).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_summary_table(reports: &[&MarketReport]) -> Table {
    let mut table = new_table();
    let mut header = vec![Cell::new("")];
    header.extend(reports.iter().map(|report| Cell::new(report.market).fg(report.market.color())));
    table.set_header(header);

    let mut add_row = |title: &str, cell: &dyn Fn(&MarketReport) -> Cell| {
        let mut row = vec![Cell::new(title)];
        row.extend(reports.iter().map(|report| right(cell(report))));
        table.add_row(row);
    };
    add_row("Savings", &|report| {
        let savings = report.summary.total_savings;
        Cell::new(savings).fg(if savings.is_negative() { Color::Red } else { Color::Green })
    });
    add_row("Savings, %", &|report| Cell::new(report.summary.percentage_savings));
    add_row("Mixed cost", &|report| Cell::new(report.summary.total_mixed_cost));
    add_row("Electric cost", &|report| Cell::new(report.summary.total_electric_cost));
    add_row("Gas cost", &|report| Cell::new(report.summary.total_gas_cost));
    add_row("All-gas cost", &|report| Cell::new(report.summary.total_counterfactual_cost));
    add_row("E-boiler intervals", &|report| Cell::new(report.summary.n_electric));
    add_row("Gas-boiler intervals", &|report| Cell::new(report.summary.n_gas));
    add_row("Unknown intervals", &|report| {
        let n_unknown = report.summary.n_unknown;
        Cell::new(n_unknown).fg(if n_unknown == 0 { Color::Reset } else { Color::DarkYellow })
    });
    table
}

pub fn build_comparison_table(comparison: &ProfitComparison) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Date"),
        Cell::new("Hour"),
        Cell::new(Market::DayAhead).fg(Market::DayAhead.color()),
        Cell::new(Market::Imbalance).fg(Market::Imbalance.color()),
        Cell::new("More profitable"),
    ]);
    let profitable_rows =
        comparison.rows.iter().filter(|row| row.day_ahead.is_some() || row.imbalance.is_some());
    for row in profitable_rows {
        table.add_row(vec![
            Cell::new(row.timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(row.timestamp.format("%H:%M")),
            right(optional(row.day_ahead)),
            right(optional(row.imbalance)),
            row.more_profitable.map_or_else(
                || Cell::new("No profits").add_attribute(Attribute::Dim),
                |market| Cell::new(market).fg(market.color()),
            ),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        right(Cell::new(comparison.total_day_ahead)).add_attribute(Attribute::Bold),
        right(Cell::new(comparison.total_imbalance)).add_attribute(Attribute::Bold),
        Cell::new(comparison.most_profitable_market)
            .fg(comparison.most_profitable_market.color())
            .add_attribute(Attribute::Bold),
    ]);
    table
}

/// Market prices and effective boiler rates of both markets, joined on the interval start.
pub fn build_prices_table(reports: &[&MarketReport], gas: MegawattHourRate) -> Table {
    let mut results: BTreeMap<Timestamp, [Option<&IntervalResult>; 2]> = BTreeMap::new();
    for report in reports {
        let column = match report.market {
            Market::DayAhead => 0,
            Market::Imbalance => 1,
        };
        for result in &report.intervals {
            results.entry(result.timestamp()).or_default()[column] = Some(result);
        }
    }

    let mut table = new_table();
    let mut header = vec![Cell::new("Date"), Cell::new("Start")];
    for market in [Market::DayAhead, Market::Imbalance] {
        header.push(Cell::new(market).fg(market.color()));
        header.push(Cell::new("E-boiler rate").fg(Color::Blue));
        header.push(Cell::new("Gas-boiler rate").fg(Color::Red));
    }
    header.push(Cell::new("Gas"));
    table.set_header(header);

    for (timestamp, columns) in results {
        let mut row = vec![
            Cell::new(timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(timestamp.format("%H:%M")),
        ];
        for result in columns {
            let price = result.and_then(|result| result.interval.price);
            row.push(right(optional(price)).fg(match price {
                Some(price) if price < gas => Color::Blue,
                Some(_) => Color::Red,
                None => Color::Reset,
            }));
            row.push(right(optional(result.map(|result| result.price_view.electric))));
            row.push(right(optional(result.map(|result| result.price_view.gas))));
        }
        row.push(right(Cell::new(gas)).add_attribute(Attribute::Dim));
        table.add_row(row);
    }
    table
}

/// Horizontal bars of the power allocated to each boiler.
pub fn build_power_table(reports: &[&MarketReport]) -> Table {
    let bars: Vec<(Market, &str, Kilowatts, Color)> = reports
        .iter()
        .flat_map(|report| {
            [
                (report.market, "E-boiler", report.summary.total_electric_power, Color::Blue),
                (report.market, "Gas-boiler", report.summary.total_gas_power, Color::Red),
            ]
        })
        .collect();
    let max_power = bars.iter().map(|(_, _, power, _)| *power).max().unwrap_or_default();

    let mut table = new_table();
    table.set_header(vec!["Market", "Boiler", "Total power", ""]);
    for (market, boiler, power, color) in bars {
        let width = if max_power.is_zero() {
            0
        } else {
            (power / max_power * Decimal::from(BAR_WIDTH)).round().to_usize().unwrap_or_default()
        };
        table.add_row(vec![
            Cell::new(market).fg(market.color()),
            Cell::new(boiler),
            right(Cell::new(power)),
            Cell::new("█".repeat(width)).fg(color),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        core::{demand::Demand, interval::PriceInterval, timestamp::parse_timestamp},
        prelude::*,
        quantity::{rate::KilowattHourRate, time::Hours},
    };

    fn report(market: Market, prices: &[Option<Decimal>]) -> Result<MarketReport> {
        let start = parse_timestamp("2024-01-01 00:00")?;
        let intervals = prices
            .iter()
            .enumerate()
            .map(|(index, price)| {
                PriceInterval::new(
                    start + Hours::from(Decimal::from(index)).to_time_delta(),
                    price.map(MegawattHourRate::from),
                    Hours::ONE,
                )
            })
            .collect();
        Ok(MarketReport::evaluate(
            market,
            intervals,
            &Demand::Constant(Kilowatts::from(dec!(100))),
            KilowattHourRate::from(dec!(0.03)),
        )?)
    }

    #[test]
    fn test_tables() -> Result {
        let day_ahead = report(Market::DayAhead, &[Some(dec!(-5)), Some(dec!(50))])?;
        let imbalance = report(Market::Imbalance, &[Some(dec!(-20)), None, Some(dec!(10))])?;
        let reports = [&day_ahead, &imbalance];

        assert_eq!(build_intervals_table(&imbalance).row_count(), 3);
        assert_eq!(build_summary_table(&reports).row_count(), 9);
        assert_eq!(build_prices_table(&reports, MegawattHourRate::from(dec!(30))).row_count(), 3);

        let comparison = ProfitComparison::compare(&day_ahead, &imbalance)?;
        let table = build_comparison_table(&comparison);
        // One profitable hour plus the total:
        assert_eq!(table.row_count(), 2);
        Ok(())
    }

    #[test]
    fn test_prices_table_shows_boiler_rates() -> Result {
        let day_ahead = report(Market::DayAhead, &[Some(dec!(-5)), Some(dec!(50))])?;
        let table = build_prices_table(&[&day_ahead], MegawattHourRate::from(dec!(30)));
        assert_eq!(table.row_count(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("E-boiler rate"));
        assert!(rendered.contains(&day_ahead.intervals[0].price_view.electric.to_string()));
        assert!(rendered.contains(&day_ahead.intervals[1].price_view.gas.to_string()));
        Ok(())
    }

    #[test]
    fn test_power_bars() -> Result {
        let day_ahead = report(Market::DayAhead, &[Some(dec!(-5)), Some(dec!(50))])?;
        let table = build_power_table(&[&day_ahead]);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains(&"█".repeat(BAR_WIDTH as usize)));
        Ok(())
    }
}
