//! [ENTSO-E Transparency Platform](https://transparency.entsoe.eu/) REST client.

use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use enumset::EnumSet;
use itertools::Itertools;
use quick_xml::de::from_str;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use ureq::{Agent, http::StatusCode};

use crate::{
    api::price_source::{DayAheadRecord, ImbalanceRecord, Payload, PriceSource},
    core::{
        market::Column,
        period::Period,
        timestamp::{TIME_ZONE, Timestamp},
    },
    prelude::*,
    quantity::{rate::MegawattHourRate, time::Hours},
};

const BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Day-ahead prices.
const DAY_AHEAD_PRICES: &str = "A44";

/// Imbalance prices.
const IMBALANCE_PRICES: &str = "A85";

/// Acknowledgement reason: no matching data found.
const NO_MATCHING_DATA: &str = "999";

pub struct Api {
    client: Agent,
    token: String,
}

impl Api {
    pub fn new(token: String) -> Self {
        let client = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(60)))
            .http_status_as_error(false)
            .build()
            .into();
        Self { client, token }
    }

    #[instrument(skip_all, fields(document_type = document_type, period = ?period))]
    fn get_document(
        &self,
        document_type: &str,
        domains: &[(&str, &str)],
        period: Period,
    ) -> Result<Option<MarketDocument>> {
        info!("fetching…");
        let mut request = self
            .client
            .get(BASE_URL)
            .query("securityToken", &self.token)
            .query("documentType", document_type)
            .query("periodStart", format_bound(period.start))
            .query("periodEnd", format_bound(period.end));
        for (key, value) in domains {
            request = request.query(*key, *value);
        }
        let mut response = request.call()?;
        let status = response.status();
        let body = response.body_mut().read_to_vec()?;
        debug!(%status, n_bytes = body.len(), "received");
        parse_response(status, &body)
    }
}

impl PriceSource for Api {
    fn fetch_day_ahead(&self, country: &str, period: Period) -> Result<Payload<DayAheadRecord>> {
        let area = area_code(country)?;
        let document = self
            .get_document(DAY_AHEAD_PRICES, &[("in_Domain", area), ("out_Domain", area)], period)
            .context("failed to fetch the day-ahead prices")?;
        let records = document.map_or_else(|| Ok(Vec::new()), |document| document.day_ahead())?;
        info!(n_records = records.len(), "fetched the day-ahead prices");
        Ok(Payload { columns: Column::Time | Column::Price, records })
    }

    fn fetch_imbalance(&self, country: &str, period: Period) -> Result<Payload<ImbalanceRecord>> {
        let area = area_code(country)?;
        let document = self
            .get_document(IMBALANCE_PRICES, &[("controlArea_Domain", area)], period)
            .context("failed to fetch the imbalance prices")?;
        let payload = document.map_or_else(
            || {
                let columns = Column::Time | Column::Long | Column::Short;
                Ok(Payload { columns, records: Vec::new() })
            },
            |document| document.imbalance(),
        )?;
        info!(n_records = payload.records.len(), "fetched the imbalance prices");
        Ok(payload)
    }
}

/// Resolve the bidding zone EIC code, raw EIC codes pass through.
fn area_code(country: &str) -> Result<&str> {
    let code = match country.to_uppercase().as_str() {
        "AT" => "10YAT-APG------L",
        "BE" => "10YBE----------2",
        "CH" => "10YCH-SWISSGRIDZ",
        "CZ" => "10YCZ-CEPS-----N",
        "DE" | "DE_LU" => "10Y1001A1001A82H",
        "DK_1" => "10YDK-1--------W",
        "DK_2" => "10YDK-2--------M",
        "ES" => "10YES-REE------0",
        "FI" => "10YFI-1--------U",
        "FR" => "10YFR-RTE------C",
        "NL" => "10YNL----------L",
        "NO_1" => "10YNO-1--------2",
        "PL" => "10YPL-AREA-----S",
        "PT" => "10YPT-REN------W",
        "SE_3" => "10Y1001A1001A46L",
        "SE_4" => "10Y1001A1001A47J",
        _ if country.len() == 16 && country.starts_with("10Y") => country,
        _ => bail!("unknown country code `{country}`"),
    };
    Ok(code)
}

fn format_bound(timestamp: Timestamp) -> String {
    timestamp.with_timezone(&Utc).format("%Y%m%d%H%M").to_string()
}

/// Parse a document instant such as `2024-01-01T23:00Z`.
fn parse_instant(text: &str) -> Result<Timestamp> {
    let utc = match NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%MZ") {
        Ok(naive) => naive.and_utc(),
        Err(_) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("`{text}` is not a valid instant"))?
            .with_timezone(&Utc),
    };
    Ok(utc.with_timezone(&TIME_ZONE))
}

/// Parse an ISO 8601 resolution such as `PT15M` or `PT1H`.
fn parse_resolution(text: &str) -> Result<TimeDelta> {
    let time = text.strip_prefix("PT").with_context(|| format!("unsupported resolution `{text}`"))?;
    let resolution = if let Some(minutes) = time.strip_suffix('M') {
        TimeDelta::minutes(minutes.parse()?)
    } else if let Some(hours) = time.strip_suffix('H') {
        TimeDelta::hours(hours.parse()?)
    } else {
        bail!("unsupported resolution `{text}`");
    };
    ensure!(resolution > TimeDelta::zero(), "resolution `{text}` must be positive");
    Ok(resolution)
}

fn parse_response(status: StatusCode, body: &[u8]) -> Result<Option<MarketDocument>> {
    ensure!(!body.starts_with(b"PK"), "zipped responses are not supported, use the CSV source");
    let body = str::from_utf8(body).context("the response is not valid UTF-8")?;

    if body.contains("Acknowledgement_MarketDocument") {
        let acknowledgement: Acknowledgement =
            from_str(body).context("failed to parse the acknowledgement")?;
        let reason =
            acknowledgement.reasons.iter().filter_map(|reason| reason.text.as_deref()).join("; ");
        if acknowledgement
            .reasons
            .iter()
            .any(|reason| reason.code.as_deref() == Some(NO_MATCHING_DATA))
        {
            warn!(%reason, "no data");
            return Ok(None);
        }
        bail!("the request has been rejected ({status}): {reason}");
    }

    ensure!(status.is_success(), "unexpected response status: {status}");
    Ok(Some(from_str(body).context("failed to parse the market document")?))
}

#[derive(Deserialize)]
struct Acknowledgement {
    #[serde(rename = "Reason", default)]
    reasons: Vec<Reason>,
}

#[derive(Deserialize)]
struct Reason {
    code: Option<String>,
    text: Option<String>,
}

/// Either a `Publication_MarketDocument` or a `Balancing_MarketDocument`.
#[derive(Deserialize)]
struct MarketDocument {
    #[serde(rename = "TimeSeries", default)]
    time_series: Vec<TimeSeries>,
}

impl MarketDocument {
    fn day_ahead(&self) -> Result<Vec<DayAheadRecord>> {
        let mut records = Vec::new();
        for time_series in &self.time_series {
            for period in &time_series.periods {
                let duration = Hours::from_time_delta(parse_resolution(&period.resolution)?);
                for (timestamp, point) in period.expand(&period.points, time_series.fills_gaps())? {
                    records.push(DayAheadRecord {
                        timestamp,
                        price: point.price.map(MegawattHourRate::from),
                        duration: Some(duration),
                    });
                }
            }
        }
        Ok(records)
    }

    fn imbalance(&self) -> Result<Payload<ImbalanceRecord>> {
        let mut columns = EnumSet::only(Column::Time);
        let mut prices: BTreeMap<Timestamp, ImbalanceRecord> = BTreeMap::new();

        for time_series in &self.time_series {
            for period in &time_series.periods {
                let by_category =
                    period.points.iter().into_group_map_by(|point| point.category.as_deref());
                for (category, points) in by_category {
                    for (timestamp, point) in period.expand(points, time_series.fills_gaps())? {
                        let price = point.imbalance_price.map(MegawattHourRate::from);
                        let record = prices.entry(timestamp).or_insert(ImbalanceRecord {
                            timestamp,
                            long: None,
                            short: None,
                        });
                        match category {
                            Some("A04") => {
                                columns |= Column::Long;
                                record.long = price;
                            }
                            Some("A05") => {
                                columns |= Column::Short;
                                record.short = price;
                            }
                            // Single price for both positions:
                            _ => {
                                columns |= Column::Long | Column::Short;
                                record.long = price;
                                record.short = price;
                            }
                        }
                    }
                }
            }
        }

        if prices.is_empty() {
            columns = Column::Time | Column::Long | Column::Short;
        }
        Ok(Payload { columns, records: prices.into_values().collect() })
    }
}

#[derive(Deserialize)]
struct TimeSeries {
    #[serde(rename = "curveType")]
    curve_type: Option<String>,

    #[serde(rename = "Period", default)]
    periods: Vec<SeriesPeriod>,
}

impl TimeSeries {
    /// `A03` curves omit points that repeat the previous value.
    fn fills_gaps(&self) -> bool {
        self.curve_type.as_deref() == Some("A03")
    }
}

#[derive(Deserialize)]
struct SeriesPeriod {
    #[serde(rename = "timeInterval")]
    time_interval: TimeInterval,

    resolution: String,

    #[serde(rename = "Point", default)]
    points: Vec<Point>,
}

impl SeriesPeriod {
    /// Timestamp the points, optionally repeating the previous point for the omitted positions.
    fn expand<'a>(
        &self,
        points: impl IntoIterator<Item = &'a Point>,
        fill_gaps: bool,
    ) -> Result<Vec<(Timestamp, &'a Point)>> {
        let start = parse_instant(&self.time_interval.start)?;
        let end = parse_instant(&self.time_interval.end)?;
        let resolution = parse_resolution(&self.resolution)?;
        let points: BTreeMap<i32, &Point> =
            points.into_iter().map(|point| (point.position, point)).collect();

        if !fill_gaps {
            return Ok(points
                .into_iter()
                .map(|(position, point)| (start + resolution * (position - 1), point))
                .collect());
        }

        let n_positions = i32::try_from((end - start).num_seconds() / resolution.num_seconds())?;
        let mut expanded = Vec::with_capacity(points.len());
        let mut last = None;
        for position in 1..=n_positions {
            if let Some(point) = points.get(&position) {
                last = Some(*point);
            }
            if let Some(point) = last {
                expanded.push((start + resolution * (position - 1), point));
            }
        }
        Ok(expanded)
    }
}

#[derive(Deserialize)]
struct TimeInterval {
    start: String,
    end: String,
}

/// Amounts are parsed from their text to keep the published precision.
#[serde_as]
#[derive(Deserialize)]
struct Point {
    /// One-based.
    #[serde_as(as = "DisplayFromStr")]
    position: i32,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(rename = "price.amount")]
    price: Option<Decimal>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(rename = "imbalance_Price.amount")]
    imbalance_price: Option<Decimal>,

    #[serde(rename = "imbalance_Price.category")]
    category: Option<String>,
}
