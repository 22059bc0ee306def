use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::Result;
use crate::error::DbError;
use crate::udbc::column::ColumnMeta;
use crate::udbc::value::Value;

/// Any type a raw result cell can be written into.
///
/// NULL always yields the destination's zero value (`None` for `Option`).
pub trait FromCell: Sized {
    fn from_cell(value: Value, column: &ColumnMeta) -> Result<Self>;
}

/// Writes `value` into `dest`. On failure `dest` is left untouched.
pub fn coerce<T: FromCell>(dest: &mut T, value: Value, column: &ColumnMeta) -> Result<()> {
    *dest = T::from_cell(value, column)?;
    Ok(())
}

/// Text payload of a currency column, if `column` is one.
fn currency_text<'a>(bytes: &'a [u8], column: &ColumnMeta) -> Option<&'a str> {
    if !column.is_currency() {
        return None;
    }
    std::str::from_utf8(bytes).ok().map(str::trim)
}

// Integers take any numeric source with `as` semantics: integers wrap, floats
// saturate and drop the fraction.
macro_rules! impl_from_cell_int {
    ($($rust_type:ty),+) => {$(
        impl FromCell for $rust_type {
            fn from_cell(value: Value, _column: &ColumnMeta) -> Result<Self> {
                match value {
                    Value::Null => Ok(0),
                    Value::Bool(b) => Ok(b as u8 as $rust_type),
                    Value::I8(n) => Ok(n as $rust_type),
                    Value::I16(n) => Ok(n as $rust_type),
                    Value::I32(n) => Ok(n as $rust_type),
                    Value::I64(n) => Ok(n as $rust_type),
                    Value::I128(n) => Ok(n as $rust_type),
                    Value::U8(n) => Ok(n as $rust_type),
                    Value::U16(n) => Ok(n as $rust_type),
                    Value::U32(n) => Ok(n as $rust_type),
                    Value::U64(n) => Ok(n as $rust_type),
                    Value::U128(n) => Ok(n as $rust_type),
                    Value::F32(n) => Ok(n as $rust_type),
                    Value::F64(n) => Ok(n as $rust_type),
                    other => Err(DbError::mismatch::<Self>(other.type_name())),
                }
            }
        }
    )+};
}

macro_rules! impl_from_cell_float {
    ($($rust_type:ty),+) => {$(
        impl FromCell for $rust_type {
            fn from_cell(value: Value, column: &ColumnMeta) -> Result<Self> {
                let source = value.type_name();
                match value {
                    Value::Null => Ok(0.0),
                    Value::I8(n) => Ok(n as $rust_type),
                    Value::I16(n) => Ok(n as $rust_type),
                    Value::I32(n) => Ok(n as $rust_type),
                    Value::I64(n) => Ok(n as $rust_type),
                    Value::I128(n) => Ok(n as $rust_type),
                    Value::U8(n) => Ok(n as $rust_type),
                    Value::U16(n) => Ok(n as $rust_type),
                    Value::U32(n) => Ok(n as $rust_type),
                    Value::U64(n) => Ok(n as $rust_type),
                    Value::U128(n) => Ok(n as $rust_type),
                    Value::F32(n) => Ok(n as $rust_type),
                    Value::F64(n) => Ok(n as $rust_type),
                    Value::Bytes(b) => currency_text(&b, column)
                        .and_then(|s| s.parse::<$rust_type>().ok())
                        .ok_or_else(|| DbError::mismatch::<Self>(source)),
                    _ => Err(DbError::mismatch::<Self>(source)),
                }
            }
        }
    )+};
}

impl_from_cell_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_cell_float!(f32, f64);

impl FromCell for bool {
    fn from_cell(value: Value, _column: &ColumnMeta) -> Result<Self> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            Value::I8(n) => Ok(n != 0),
            Value::I16(n) => Ok(n != 0),
            Value::I32(n) => Ok(n != 0),
            Value::I64(n) => Ok(n != 0),
            Value::I128(n) => Ok(n != 0),
            Value::U8(n) => Ok(n != 0),
            Value::U16(n) => Ok(n != 0),
            Value::U32(n) => Ok(n != 0),
            Value::U64(n) => Ok(n != 0),
            Value::U128(n) => Ok(n != 0),
            Value::F32(n) => Ok(n != 0.0),
            Value::F64(n) => Ok(n != 0.0),
            other => Err(DbError::mismatch::<Self>(other.type_name())),
        }
    }
}

impl FromCell for String {
    fn from_cell(value: Value, _column: &ColumnMeta) -> Result<Self> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Str(s) => Ok(s),
            Value::Bytes(b) => Ok(String::from_utf8_lossy(&b).into_owned()),
            other => Err(DbError::mismatch::<Self>(other.type_name())),
        }
    }
}

impl FromCell for Decimal {
    fn from_cell(value: Value, column: &ColumnMeta) -> Result<Self> {
        let source = value.type_name();
        match value {
            Value::Null => Ok(Decimal::ZERO),
            Value::Decimal(d) => Ok(d),
            Value::Bytes(b) => currency_text(&b, column)
                .and_then(|s| Decimal::from_str(s).ok())
                .ok_or_else(|| DbError::mismatch::<Self>(source)),
            _ => Err(DbError::mismatch::<Self>(source)),
        }
    }
}

macro_rules! impl_from_cell_temporal {
    ($rust_type:ty, $variant:ident) => {
        impl FromCell for $rust_type {
            fn from_cell(value: Value, _column: &ColumnMeta) -> Result<Self> {
                match value {
                    Value::Null => Ok(<$rust_type>::default()),
                    Value::$variant(v) => Ok(v),
                    other => Err(DbError::mismatch::<Self>(other.type_name())),
                }
            }
        }
    };
}

impl_from_cell_temporal!(NaiveDate, Date);
impl_from_cell_temporal!(NaiveTime, Time);
impl_from_cell_temporal!(NaiveDateTime, DateTime);
impl_from_cell_temporal!(DateTime<Utc>, DateTimeUtc);

// Keeps the raw cell.
impl FromCell for Value {
    fn from_cell(value: Value, _column: &ColumnMeta) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromCell> FromCell for Box<T> {
    fn from_cell(value: Value, column: &ColumnMeta) -> Result<Self> {
        T::from_cell(value, column).map(Box::new)
    }
}

impl<T: FromCell> FromCell for Option<T> {
    fn from_cell(value: Value, column: &ColumnMeta) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_cell(value, column)?)),
        }
    }
}
