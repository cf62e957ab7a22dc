//! CSV order import: decoding and row parsing.
//!
//! Expected header: `delivery_address,promocode,user,products`, where
//! `products` is a comma-separated list of product IDs. Rows are numbered
//! from 1; row 0 is the header. Parsing never touches the database; user
//! and product resolution happens in the importing transaction.

use std::borrow::Cow;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::MAX_PROMOCODE_LENGTH;
use crate::errors::{AppError, AppResult};

const COLUMN_DELIVERY_ADDRESS: &str = "delivery_address";
const COLUMN_PROMOCODE: &str = "promocode";
const COLUMN_USER: &str = "user";
const COLUMN_PRODUCTS: &str = "products";

const BOM: char = '\u{feff}';

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    /// Number of orders created
    #[schema(example = 5)]
    pub created: usize,
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub row: usize,
    pub delivery_address: String,
    pub promocode: String,
    pub user_id: i32,
    /// Distinct product IDs in first-seen order
    pub product_ids: Vec<i32>,
}

/// Decode the whole upload with the encoding named by `label`.
///
/// Labels follow the WHATWG Encoding Standard (`utf-8`, `windows-1251`,
/// `latin1`, ...). Undecodable bytes are an error, never replaced.
pub fn decode<'a>(data: &'a [u8], label: &str) -> AppResult<Cow<'a, str>> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| AppError::Encoding(format!("unknown encoding '{}'", label)))?;

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .ok_or_else(|| AppError::Encoding(format!("file is not valid {}", encoding.name())))?;

    Ok(match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix(BOM).unwrap_or(s)),
        Cow::Owned(s) if s.starts_with(BOM) => Cow::Owned(s[BOM.len_utf8()..].to_string()),
        owned => owned,
    })
}

/// Parse decoded CSV text into rows. Blank lines and rows with only empty
/// fields are skipped.
pub fn parse_rows(text: &str) -> AppResult<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::malformed_row(0, e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AppError::malformed_row(0, format!("missing column '{}'", name)))
    };
    let address_col = column(COLUMN_DELIVERY_ADDRESS)?;
    let promocode_col = column(COLUMN_PROMOCODE)?;
    let user_col = column(COLUMN_USER)?;
    let products_col = column(COLUMN_PRODUCTS)?;
    // An unquoted product list spills into extra trailing fields
    let products_last = products_col + 1 == headers.len();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|e| AppError::malformed_row(row, e.to_string()))?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |col: usize| record.get(col).unwrap_or("");
        let products_raw = if products_last && record.len() > headers.len() {
            record.iter().skip(products_col).collect::<Vec<_>>().join(",")
        } else {
            field(products_col).to_string()
        };

        rows.push(ImportRow {
            row,
            delivery_address: field(address_col).to_string(),
            promocode: parse_promocode(row, field(promocode_col))?,
            user_id: parse_user_id(row, field(user_col))?,
            product_ids: parse_product_ids(row, &products_raw)?,
        });
    }

    Ok(rows)
}

fn parse_promocode(row: usize, raw: &str) -> AppResult<String> {
    if raw.chars().count() > MAX_PROMOCODE_LENGTH {
        return Err(AppError::malformed_row(
            row,
            format!("promocode is longer than {} characters", MAX_PROMOCODE_LENGTH),
        ));
    }
    Ok(raw.to_string())
}

fn parse_user_id(row: usize, raw: &str) -> AppResult<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::malformed_row(row, "user is required"));
    }
    raw.parse()
        .map_err(|_| AppError::malformed_row(row, format!("user '{}' is not an integer", raw)))
}

fn parse_product_ids(row: usize, raw: &str) -> AppResult<Vec<i32>> {
    let mut ids: Vec<i32> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part.parse().map_err(|_| {
            AppError::malformed_row(row, format!("product '{}' is not an integer", part))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
