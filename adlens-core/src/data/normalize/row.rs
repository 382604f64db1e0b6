//! Typed cell access over one raw row.
//!
//! Required accessors never default: a blank cell is a `MissingField` schema
//! error and a malformed number is an `InvalidValue` error. Optional accessors
//! map an absent column or blank cell to `None` but still reject malformed text.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::data::error::DataError;
use crate::data::reader::{ColumnIndex, RawRow};
use crate::data::schema::SchemaError;
use crate::domain::Platform;

pub struct RowView<'a> {
    platform: Platform,
    columns: &'a ColumnIndex,
    row: &'a RawRow,
}

impl<'a> RowView<'a> {
    pub fn new(platform: Platform, columns: &'a ColumnIndex, row: &'a RawRow) -> Self {
        Self {
            platform,
            columns,
            row,
        }
    }

    pub fn line(&self) -> u64 {
        self.row.line
    }

    /// Cell text, `None` when the column is not in the header.
    fn cell(&self, column: &str) -> Option<&'a str> {
        let position = self.columns.position(column)?;
        Some(self.row.record.get(position).unwrap_or("").trim())
    }

    fn required(&self, column: &str) -> Result<&'a str, DataError> {
        match self.cell(column) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(SchemaError::MissingField {
                platform: self.platform,
                line: self.row.line,
                column: column.to_string(),
            }
            .into()),
        }
    }

    fn invalid(&self, column: &str, value: &str, reason: &'static str) -> DataError {
        DataError::InvalidValue {
            platform: self.platform,
            line: self.row.line,
            column: column.to_string(),
            value: value.to_string(),
            reason,
        }
    }

    pub fn text(&self, column: &str) -> Result<String, DataError> {
        self.required(column).map(str::to_string)
    }

    pub fn count(&self, column: &str) -> Result<u64, DataError> {
        let raw = self.required(column)?;
        parse_count(raw).map_err(|reason| self.invalid(column, raw, reason))
    }

    pub fn amount(&self, column: &str) -> Result<Decimal, DataError> {
        let raw = self.required(column)?;
        parse_amount(raw).map_err(|reason| self.invalid(column, raw, reason))
    }

    pub fn optional_count(&self, column: &str) -> Result<Option<u64>, DataError> {
        match self.cell(column) {
            None | Some("") => Ok(None),
            Some(raw) => parse_count(raw)
                .map(Some)
                .map_err(|reason| self.invalid(column, raw, reason)),
        }
    }

    pub fn optional_real(&self, column: &str) -> Result<Option<f64>, DataError> {
        match self.cell(column) {
            None | Some("") => Ok(None),
            Some(raw) => parse_real(raw)
                .map(Some)
                .map_err(|reason| self.invalid(column, raw, reason)),
        }
    }

    pub fn overflow(&self, column: &str) -> DataError {
        self.invalid(column, "", "value out of range")
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, &'static str> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| "not a number")
}

/// Non-negative integer. `12.0` is accepted, `12.5` and `-1` are not.
pub fn parse_count(raw: &str) -> Result<u64, &'static str> {
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }
    let value = parse_decimal(raw)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err("negative value");
    }
    if !value.fract().is_zero() {
        return Err("not a whole number");
    }
    value.to_u64().ok_or("value out of range")
}

/// Non-negative exact decimal (money).
pub fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    let value = parse_decimal(raw)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err("negative value");
    }
    Ok(value.normalize())
}

/// Non-negative finite float (rates, scores).
pub fn parse_real(raw: &str) -> Result<f64, &'static str> {
    let value: f64 = raw.parse().map_err(|_| "not a number")?;
    if !value.is_finite() {
        return Err("not a finite number");
    }
    if value < 0.0 {
        return Err("negative value");
    }
    Ok(value)
}
