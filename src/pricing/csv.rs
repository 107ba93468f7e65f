//! CSV import/export for the fare catalog.
//!
//! Export writes every rule with quoted fields so names containing commas
//! survive a spreadsheet round trip. Import is forgiving about column order
//! and extra columns, strict about values: each bad row is reported with its
//! line number and skipped.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::domain::{CalculationType, FarePricing, FareRuleDraft, RuleStatus};

const HEADERS: [&str; 13] = [
    "ID",
    "Name",
    "Vehicle Type",
    "Base Fare",
    "Minimum Fare",
    "Price/KM",
    "Price/Min",
    "Booking Fee",
    "Platform Fee",
    "Surge Multiplier",
    "Status",
    "Priority",
    "Created At",
];

/// Outcome of a catalog import.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvImportReport {
    pub imported: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// One parsed data row, tagged with its line number in the source file.
pub(crate) struct ParsedRow {
    pub(crate) line: usize,
    pub(crate) outcome: Result<FareRuleDraft, String>,
}

pub(crate) fn export_rules(rules: &[FarePricing]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for rule in rules {
        writer.write_record(record_for(rule))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn record_for(rule: &FarePricing) -> [String; 13] {
    [
        rule.id.0.clone(),
        rule.name.clone(),
        rule.vehicle_type.clone().unwrap_or_default(),
        rule.base_fare.to_string(),
        rule.minimum_fare.to_string(),
        decimal_or_empty(rule.price_per_km),
        decimal_or_empty(rule.price_per_minute),
        rule.booking_fee.to_string(),
        rule.platform_fee.to_string(),
        rule.surge_multiplier.to_string(),
        rule.status.label().to_string(),
        rule.priority.to_string(),
        rule.created_at.to_rfc3339(),
    ]
}

fn decimal_or_empty(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse catalog rows from raw CSV text. `ID` and `Created At` columns are
/// ignored when present; imported rules always receive fresh identities.
pub(crate) fn parse_rules(content: &str) -> Vec<ParsedRow> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .deserialize::<CatalogRow>()
        .enumerate()
        .map(|(index, record)| {
            // Row 1 is the header, data starts on line 2.
            let line = index + 2;
            let outcome = match record {
                Ok(row) => row.into_draft(),
                Err(err) => Err(err.to_string()),
            };
            ParsedRow { line, outcome }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Vehicle Type", deserialize_with = "empty_string_as_none")]
    vehicle_type: Option<String>,
    #[serde(rename = "Base Fare")]
    base_fare: String,
    #[serde(rename = "Minimum Fare")]
    minimum_fare: String,
    #[serde(rename = "Price/KM", deserialize_with = "empty_string_as_none")]
    price_per_km: Option<String>,
    #[serde(rename = "Price/Min", deserialize_with = "empty_string_as_none")]
    price_per_minute: Option<String>,
    #[serde(rename = "Booking Fee")]
    booking_fee: String,
    #[serde(rename = "Platform Fee")]
    platform_fee: String,
    #[serde(rename = "Surge Multiplier")]
    surge_multiplier: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Priority")]
    priority: String,
}

impl CatalogRow {
    fn into_draft(self) -> Result<FareRuleDraft, String> {
        let base_fare = parse_amount("Base Fare", &self.base_fare)?;
        let minimum_fare = parse_amount("Minimum Fare", &self.minimum_fare)?;
        let price_per_km = self
            .price_per_km
            .as_deref()
            .map(|value| parse_amount("Price/KM", value))
            .transpose()?;
        let price_per_minute = self
            .price_per_minute
            .as_deref()
            .map(|value| parse_amount("Price/Min", value))
            .transpose()?;
        let booking_fee = parse_amount("Booking Fee", &self.booking_fee)?;
        let platform_fee = parse_amount("Platform Fee", &self.platform_fee)?;
        let surge_multiplier = parse_amount("Surge Multiplier", &self.surge_multiplier)?;

        let status = RuleStatus::parse(&self.status).ok_or_else(|| {
            format!(
                "Status '{}' is not one of active, inactive, scheduled",
                self.status
            )
        })?;
        let priority: u32 = self
            .priority
            .parse()
            .map_err(|_| format!("Priority '{}' is not a whole number", self.priority))?;

        let calculation_type =
            CalculationType::infer(price_per_km.is_some(), price_per_minute.is_some());

        let mut draft = FareRuleDraft::new(self.name, calculation_type);
        draft.vehicle_type = self.vehicle_type;
        draft.base_fare = base_fare;
        draft.minimum_fare = minimum_fare;
        draft.price_per_km = price_per_km;
        draft.price_per_minute = price_per_minute;
        draft.booking_fee = booking_fee;
        draft.platform_fee = platform_fee;
        draft.surge_multiplier = surge_multiplier;
        draft.surge_enabled = surge_multiplier > Decimal::ONE;
        draft.status = status;
        draft.priority = priority;
        Ok(draft)
    }
}

fn parse_amount(column: &str, value: &str) -> Result<Decimal, String> {
    value
        .parse()
        .map_err(|_| format!("{column} '{value}' is not a valid amount"))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
