// Primitives for reading the rows of a JSON document.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use std::str::FromStr;

use expenditure_map::{Amount, MunicipalityId};

use crate::dash::*;

pub type JSObject = JSMap<String, JSValue>;

fn malformed<T>(source_name: &str, reason: String) -> DashResult<T> {
    MalformedDatasetSnafu {
        source_name,
        reason,
    }
    .fail()
}

/// The elements of a document that must be an array of objects.
pub fn as_rows<'a>(source_name: &str, js: &'a JSValue) -> DashResult<Vec<&'a JSObject>> {
    let elts = match js.as_array() {
        Some(elts) => elts,
        None => return malformed(source_name, format!("expected an array, got {}", kind_of(js))),
    };
    let mut res: Vec<&JSObject> = Vec::with_capacity(elts.len());
    for (idx, elt) in elts.iter().enumerate() {
        match elt.as_object() {
            Some(obj) => res.push(obj),
            None => {
                return malformed(
                    source_name,
                    format!("row {}: expected an object, got {}", idx, kind_of(elt)),
                )
            }
        }
    }
    Ok(res)
}

/// Reads the fields of one row, reporting errors with the row position.
pub struct RowReader<'a> {
    pub source_name: &'a str,
    pub lineno: usize,
    pub obj: &'a JSObject,
}

impl<'a> RowReader<'a> {
    pub fn new(source_name: &'a str, lineno: usize, obj: &'a JSObject) -> RowReader<'a> {
        RowReader {
            source_name,
            lineno,
            obj,
        }
    }

    fn fail<T>(&self, reason: String) -> DashResult<T> {
        malformed(self.source_name, format!("row {}: {}", self.lineno, reason))
    }

    // The first key that is present, with its value.
    fn lookup(&self, keys: &[&'static str]) -> Option<(&'static str, &'a JSValue)> {
        keys.iter()
            .find_map(|k| self.obj.get(*k).map(|v| (*k, v)))
    }

    fn required(&self, keys: &[&'static str]) -> DashResult<(&'static str, &'a JSValue)> {
        match self.lookup(keys) {
            Some(x) => Ok(x),
            None => self.fail(format!("missing field {}", keys.join(" or "))),
        }
    }

    pub fn string(&self, keys: &[&'static str]) -> DashResult<String> {
        match self.required(keys)? {
            (_, JSValue::String(s)) => Ok(s.clone()),
            (k, v) => self.fail(format!("field {} should be a string, got {}", k, kind_of(v))),
        }
    }

    pub fn decimal(&self, keys: &[&'static str]) -> DashResult<Decimal> {
        let (k, v) = self.required(keys)?;
        match read_js_decimal(v) {
            Some(x) => Ok(x),
            None => self.fail(format!("field {} should be a number, got {}", k, v)),
        }
    }

    pub fn number(&self, keys: &[&'static str]) -> DashResult<f64> {
        let (k, v) = self.required(keys)?;
        match read_js_number(v) {
            Some(x) => Ok(x),
            None => self.fail(format!("field {} should be a number, got {}", k, v)),
        }
    }

    pub fn amount(&self, keys: &[&'static str]) -> DashResult<Amount> {
        let x = self.decimal(keys)?;
        if x.is_sign_negative() && !x.is_zero() {
            return self.fail(format!("negative amount {}", x));
        }
        Ok(Amount::new(x))
    }

    pub fn id(&self, keys: &[&'static str]) -> DashResult<MunicipalityId> {
        let (k, v) = self.required(keys)?;
        match read_js_id(v) {
            Some(id) => Ok(id),
            None => self.fail(format!("field {} is not a valid id: {}", k, v)),
        }
    }

    pub fn optional_id(&self, keys: &[&'static str]) -> DashResult<Option<MunicipalityId>> {
        match self.lookup(keys) {
            None | Some((_, JSValue::Null)) => Ok(None),
            Some(_) => self.id(keys).map(Some),
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Numbers may come as JSON numbers or as strings. They are read from their
/// decimal text, so `0.1` stays `0.1`.
pub fn read_js_decimal(x: &JSValue) -> Option<Decimal> {
    match x {
        JSValue::Number(n) => parse_decimal(&n.to_string()),
        JSValue::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

pub fn read_js_number(x: &JSValue) -> Option<f64> {
    read_js_decimal(x).and_then(|d| d.to_f64())
}

/// Ids are kept verbatim when they are strings. Integral numbers are written
/// in decimal.
pub fn read_js_id(x: &JSValue) -> Option<MunicipalityId> {
    match x {
        JSValue::String(s) if !s.is_empty() => Some(MunicipalityId::new(s.clone())),
        JSValue::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(MunicipalityId::new(u.to_string()))
            } else if let Some(i) = n.as_i64() {
                Some(MunicipalityId::new(i.to_string()))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| MunicipalityId::new(format!("{:.0}", f)))
            }
        }
        _ => None,
    }
}

pub fn kind_of(x: &JSValue) -> &'static str {
    match x {
        JSValue::Null => "null",
        JSValue::Bool(_) => "a boolean",
        JSValue::Number(_) => "a number",
        JSValue::String(_) => "a string",
        JSValue::Array(_) => "an array",
        JSValue::Object(_) => "an object",
    }
}
