//! Result formatter: catalogue rows to compact part entries.
//!
//! Pure transformation. Columns are read by name so the projection order in
//! [`crate::query`] does not matter. Optional values that are NULL or
//! unparsable render as [`UNKNOWN`] instead of disappearing, so the reader
//! can tell "no data" apart from "not requested".

use crate::error::FormatError;
use crate::types::LcscId;
use rusqlite::types::Value;
use rusqlite::Row;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Marker for a field the catalogue has no usable value for.
pub const UNKNOWN: &str = "unknown";

/// Decimal places used for every rendered price.
pub const PRICE_DECIMALS: usize = 4;

/// One row of the `components` table joined with its lookup names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartRecord {
    pub lcsc: LcscId,
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub manufacturer_id: Option<i64>,
    pub manufacturer: Option<String>,
    pub mfr: Option<String>,
    pub description: Option<String>,
    pub package: Option<String>,
    pub stock: Option<i64>,
    /// Raw price-break JSON.
    pub price: Option<String>,
    pub basic: Option<bool>,
    pub preferred: Option<bool>,
    pub datasheet: Option<String>,
    /// Raw `extra` JSON (attributes, images).
    pub extra: Option<String>,
}

/// Reads a column as a raw value. `Ok(None)` means the column is absent.
fn raw(row: &Row<'_>, name: &'static str) -> Result<Option<Value>, FormatError> {
    match row.get::<_, Value>(name) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(e) => Err(FormatError::BadType {
            column: name,
            reason: e.to_string(),
        }),
    }
}

/// Like [`raw`], but the column has to exist.
fn mandatory(row: &Row<'_>, name: &'static str) -> Result<Value, FormatError> {
    raw(row, name)?.ok_or(FormatError::MissingColumn(name))
}

fn as_int(v: Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(i),
        Value::Real(f) if f.is_finite() => Some(f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(v: Value) -> Option<String> {
    match v {
        Value::Text(s) if !s.trim().is_empty() => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        _ => None,
    }
}

fn as_flag(v: Value) -> Option<bool> {
    as_int(v).map(|i| i != 0)
}

fn opt_int(row: &Row<'_>, name: &'static str) -> Result<Option<i64>, FormatError> {
    Ok(raw(row, name)?.and_then(as_int))
}

fn opt_text(row: &Row<'_>, name: &'static str) -> Result<Option<String>, FormatError> {
    Ok(raw(row, name)?.and_then(as_text))
}

impl PartRecord {
    /// Reads a record from a query row.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::MissingColumn` when `lcsc`, `mfr`, `stock` or
    /// `basic` is not in the row, and `FormatError::NullColumn` when `lcsc`
    /// has no value.
    pub fn from_row(row: &Row<'_>) -> Result<Self, FormatError> {
        let lcsc = as_int(mandatory(row, "lcsc")?).ok_or(FormatError::NullColumn("lcsc"))?;
        let mfr = mandatory(row, "mfr")?;
        let stock = mandatory(row, "stock")?;
        let basic = mandatory(row, "basic")?;

        Ok(Self {
            lcsc: LcscId::new(lcsc),
            category_id: opt_int(row, "category_id")?,
            category: opt_text(row, "category")?,
            subcategory: opt_text(row, "subcategory")?,
            manufacturer_id: opt_int(row, "manufacturer_id")?,
            manufacturer: opt_text(row, "manufacturer")?,
            mfr: as_text(mfr),
            description: opt_text(row, "description")?,
            package: opt_text(row, "package")?,
            stock: as_int(stock),
            price: opt_text(row, "price")?,
            basic: as_flag(basic),
            preferred: raw(row, "preferred")?.and_then(as_flag),
            datasheet: opt_text(row, "datasheet")?,
            extra: opt_text(row, "extra")?,
        })
    }
}

/// A quantity tier and its unit price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreak {
    pub q_from: Option<i64>,
    pub q_to: Option<i64>,
    pub price: f64,
}

impl PriceBreak {
    /// `1-9: $0.0012`, or `1000+: $0.0008` for the open-ended top tier.
    #[must_use]
    pub fn render(&self) -> String {
        let from = self.q_from.unwrap_or(1);
        let price = render_price(self.price);
        match self.q_to {
            Some(to) => format!("{from}-{to}: ${price}"),
            None => format!("{from}+: ${price}"),
        }
    }
}

/// Parses the catalogue's price JSON. `None` when absent or malformed.
#[must_use]
pub fn parse_price_breaks(json: Option<&str>) -> Option<Vec<PriceBreak>> {
    let breaks: Vec<PriceBreak> = serde_json::from_str(json?).ok()?;
    if breaks.is_empty() {
        None
    } else {
        Some(breaks)
    }
}

#[must_use]
pub fn render_price(price: f64) -> String {
    format!("{price:.prec$}", prec = PRICE_DECIMALS)
}

/// Renders `extra.attributes` as `key: value` pairs sorted by key.
#[must_use]
pub fn render_attributes(extra: Option<&str>) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(extra?).ok()?;
    let attrs = value.get("attributes")?.as_object()?;

    let mut pairs: Vec<(&String, String)> = attrs
        .iter()
        .map(|(k, v)| {
            let rendered = match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k, rendered)
        })
        .collect();
    if pairs.is_empty() {
        return None;
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    Some(
        pairs
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// A product photo at one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PartImage {
    /// Resolution label from the catalogue, e.g. `224x224`
    pub size: String,
    pub url: String,
}

/// Pixel width of a `WxH` label, for ordering. Unparsable labels sort last.
fn image_width(label: &str) -> u32 {
    label
        .split('x')
        .next()
        .and_then(|w| w.parse().ok())
        .unwrap_or(u32::MAX)
}

/// Image URLs from `extra.images`, each photo's sizes smallest first.
#[must_use]
pub fn image_urls(extra: Option<&str>) -> Vec<Vec<PartImage>> {
    let Some(value) = extra.and_then(|e| serde_json::from_str::<serde_json::Value>(e).ok()) else {
        return Vec::new();
    };
    let Some(images) = value.get("images").and_then(|i| i.as_array()) else {
        return Vec::new();
    };

    images
        .iter()
        .filter_map(|img| img.as_object())
        .map(|sizes| {
            let mut set: Vec<PartImage> = sizes
                .iter()
                .filter_map(|(size, url)| {
                    url.as_str().map(|u| PartImage {
                        size: size.clone(),
                        url: u.to_string(),
                    })
                })
                .collect();
            set.sort_by_key(|i| image_width(&i.size));
            set
        })
        .filter(|set| !set.is_empty())
        .collect()
}

/// Medium resolution of the first photo.
#[must_use]
pub fn medium_image(sets: &[Vec<PartImage>]) -> Option<&PartImage> {
    let first = sets.first()?;
    first.get(first.len() / 2)
}

/// Assistant-facing projection of a part. Field order is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PartEntry {
    /// Catalogue part number, e.g. C25804
    pub lcsc: String,
    /// Manufacturer part number
    pub mfr_part: String,
    pub manufacturer: String,
    pub description: String,
    pub package: String,
    /// "Category / Subcategory"
    pub category: String,
    pub stock: String,
    /// Unit price at the smallest quantity, USD
    pub price: String,
    /// All quantity tiers, e.g. "1-9: $0.0012, 10+: $0.0010"
    pub price_breaks: String,
    /// basic or extended
    pub part_type: String,
    /// yes or no
    pub preferred: String,
    pub datasheet: String,
    /// Parametric attributes, present when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
}

fn or_unknown(v: Option<String>) -> String {
    v.unwrap_or_else(|| UNKNOWN.to_string())
}

fn render_category(rec: &PartRecord) -> Option<String> {
    match (&rec.category, &rec.subcategory) {
        (Some(c), Some(s)) => Some(format!("{c} / {s}")),
        (Some(c), None) => Some(c.clone()),
        (None, Some(s)) => Some(s.clone()),
        (None, None) => None,
    }
}

/// Shapes one record. `with_attributes` controls the `attributes` field.
#[must_use]
pub fn format_record(rec: &PartRecord, with_attributes: bool) -> PartEntry {
    let breaks = parse_price_breaks(rec.price.as_deref());

    let price = breaks
        .as_ref()
        .and_then(|b| b.first())
        .map(|b| render_price(b.price));
    let price_breaks = breaks.as_ref().map(|b| {
        b.iter()
            .map(PriceBreak::render)
            .collect::<Vec<_>>()
            .join(", ")
    });

    let attributes = with_attributes
        .then(|| or_unknown(render_attributes(rec.extra.as_deref())));

    PartEntry {
        lcsc: rec.lcsc.to_string(),
        mfr_part: or_unknown(rec.mfr.clone()),
        manufacturer: or_unknown(rec.manufacturer.clone()),
        description: or_unknown(rec.description.clone()),
        package: or_unknown(rec.package.clone()),
        category: or_unknown(render_category(rec)),
        stock: or_unknown(rec.stock.map(|s| s.to_string())),
        price: or_unknown(price),
        price_breaks: or_unknown(price_breaks),
        part_type: or_unknown(
            rec.basic
                .map(|b| String::from(if b { "basic" } else { "extended" })),
        ),
        preferred: or_unknown(rec.preferred.map(|p| String::from(if p { "yes" } else { "no" }))),
        datasheet: or_unknown(rec.datasheet.clone()),
        attributes,
    }
}

/// Shapes a batch of records, preserving order.
#[must_use]
pub fn format_records(recs: &[PartRecord], with_attributes: bool) -> Vec<PartEntry> {
    recs.iter().map(|r| format_record(r, with_attributes)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    const PRICE: &str = r#"[{"qFrom":1,"qTo":9,"price":0.0123},{"qFrom":10,"qTo":null,"price":0.01}]"#;
    const EXTRA: &str = r#"{"attributes":{"Tolerance":"±1%","Resistance":"10kΩ","Power":0.1},
        "images":[{"96x96":"https://img/s.jpg","900x900":"https://img/l.jpg","224x224":"https://img/m.jpg"}]}"#;

    fn record() -> PartRecord {
        PartRecord {
            lcsc: LcscId::new(25804),
            category: Some("Resistors".to_string()),
            subcategory: Some("Chip Resistor - Surface Mount".to_string()),
            manufacturer: Some("UNI-ROYAL".to_string()),
            mfr: Some("0603WAF1002T5E".to_string()),
            description: Some("10kΩ 0603 ±1%".to_string()),
            package: Some("0603".to_string()),
            stock: Some(1_234_567),
            price: Some(PRICE.to_string()),
            basic: Some(true),
            preferred: Some(false),
            datasheet: Some("https://example.com/ds.pdf".to_string()),
            extra: Some(EXTRA.to_string()),
            ..PartRecord::default()
        }
    }

    #[test]
    fn test_format_full_record() {
        let e = format_record(&record(), true);
        assert_eq!(e.lcsc, "C25804");
        assert_eq!(e.category, "Resistors / Chip Resistor - Surface Mount");
        assert_eq!(e.stock, "1234567");
        assert_eq!(e.price, "0.0123");
        assert_eq!(e.price_breaks, "1-9: $0.0123, 10+: $0.0100");
        assert_eq!(e.part_type, "basic");
        assert_eq!(e.preferred, "no");
        assert_eq!(
            e.attributes.as_deref(),
            Some("Power: 0.1; Resistance: 10kΩ; Tolerance: ±1%")
        );
    }

    #[test]
    fn test_nulls_render_unknown() {
        let rec = PartRecord {
            lcsc: LcscId::new(7),
            ..PartRecord::default()
        };
        let e = format_record(&rec, true);
        assert_eq!(e.mfr_part, UNKNOWN);
        assert_eq!(e.description, UNKNOWN);
        assert_eq!(e.stock, UNKNOWN);
        assert_eq!(e.price, UNKNOWN);
        assert_eq!(e.price_breaks, UNKNOWN);
        assert_eq!(e.part_type, UNKNOWN);
        assert_eq!(e.attributes.as_deref(), Some(UNKNOWN));
    }

    #[test]
    fn test_attributes_omitted_when_not_requested() {
        let e = format_record(&record(), false);
        assert!(e.attributes.is_none());
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("attributes"));
    }

    #[test]
    fn test_malformed_price_is_unknown() {
        let rec = PartRecord {
            price: Some("not json".to_string()),
            ..record()
        };
        let e = format_record(&rec, false);
        assert_eq!(e.price, UNKNOWN);
        assert_eq!(e.price_breaks, UNKNOWN);
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&format_record(&record(), false)).unwrap();
        let keys = [
            "\"lcsc\"", "\"mfr_part\"", "\"manufacturer\"", "\"description\"", "\"package\"",
            "\"category\"", "\"stock\"", "\"price\"", "\"price_breaks\"", "\"part_type\"",
            "\"preferred\"", "\"datasheet\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn test_images_sorted_by_size() {
        let sets = image_urls(Some(EXTRA));
        assert_eq!(sets.len(), 1);
        let sizes: Vec<&str> = sets[0].iter().map(|i| i.size.as_str()).collect();
        assert_eq!(sizes, vec!["96x96", "224x224", "900x900"]);
        assert_eq!(medium_image(&sets).unwrap().url, "https://img/m.jpg");
        assert!(image_urls(None).is_empty());
        assert!(image_urls(Some("{}")).is_empty());
    }

    #[test]
    fn test_from_row_missing_mandatory_column() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .query_row("SELECT 1 AS lcsc, 5 AS stock, 1 AS basic", [], |row| {
                Ok(PartRecord::from_row(row))
            })
            .unwrap()
            .unwrap_err();
        assert_eq!(err, FormatError::MissingColumn("mfr"));
    }

    #[test]
    fn test_from_row_null_lcsc() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .query_row(
                "SELECT NULL AS lcsc, 'X' AS mfr, 5 AS stock, 1 AS basic",
                [],
                |row| Ok(PartRecord::from_row(row)),
            )
            .unwrap()
            .unwrap_err();
        assert_eq!(err, FormatError::NullColumn("lcsc"));
    }

    #[test]
    fn test_from_row_optional_columns_absent() {
        let conn = Connection::open_in_memory().unwrap();
        let rec = conn
            .query_row(
                "SELECT 42 AS lcsc, 'RC0603' AS mfr, NULL AS stock, 0 AS basic",
                [],
                |row| Ok(PartRecord::from_row(row)),
            )
            .unwrap()
            .unwrap();
        assert_eq!(rec.lcsc, LcscId::new(42));
        assert_eq!(rec.stock, None);
        assert_eq!(rec.basic, Some(false));
        assert_eq!(rec.description, None);
    }
}
