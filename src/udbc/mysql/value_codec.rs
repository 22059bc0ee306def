use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::Value as MyValue;
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Row};
use rust_decimal::Decimal;

use crate::udbc::column::ColumnMeta;
use crate::udbc::value::Value;

/// Column metadata with the declared wire type, e.g. `NEWDECIMAL` or `VARCHAR`.
pub fn column_meta(col: &Column) -> ColumnMeta {
    let type_name = format!("{:?}", col.column_type());
    ColumnMeta::new(col.name_str().to_string())
        .with_type(type_name.trim_start_matches("MYSQL_TYPE_"))
}

/// Decodes every cell of `row` using the column types it carries.
pub fn decode_row(row: Row) -> Vec<Value> {
    let types: Vec<ColumnType> = row.columns_ref().iter().map(|c| c.column_type()).collect();
    row.unwrap()
        .into_iter()
        .zip(types)
        .map(|(v, ty)| from_mysql_value(v, ty))
        .collect()
}

/// Byte payloads are typed by the column: decimals become [`Value::Decimal`],
/// character columns [`Value::Str`] when valid UTF-8, anything else stays raw.
pub fn from_mysql_value(v: MyValue, ty: ColumnType) -> Value {
    match v {
        MyValue::NULL => Value::Null,
        MyValue::Int(i) => Value::I64(i),
        MyValue::UInt(u) => Value::U64(u),
        MyValue::Float(f) => Value::F32(f),
        MyValue::Double(d) => Value::F64(d),
        MyValue::Bytes(b) => decode_bytes(b, ty),
        MyValue::Date(y, m, d, h, min, s, micro) => {
            let Some(date) = NaiveDate::from_ymd_opt(y.into(), m.into(), d.into()) else {
                // Zero dates such as 0000-00-00 have no chrono counterpart.
                return Value::Null;
            };
            match ty {
                ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => Value::Date(date),
                _ => date
                    .and_hms_micro_opt(h.into(), min.into(), s.into(), micro)
                    .map(Value::DateTime)
                    .unwrap_or(Value::Date(date)),
            }
        }
        MyValue::Time(is_neg, days, h, min, s, micro) => {
            match NaiveTime::from_hms_micro_opt(h.into(), min.into(), s.into(), micro) {
                Some(t) if !is_neg && days == 0 => Value::Time(t),
                // Durations outside a single day stay textual.
                _ => Value::Str(format!(
                    "{}{:02}:{:02}:{:02}.{:06}",
                    if is_neg { "-" } else { "" },
                    u32::from(h) + days * 24,
                    min,
                    s,
                    micro
                )),
            }
        }
    }
}

fn decode_bytes(b: Vec<u8>, ty: ColumnType) -> Value {
    match ty {
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            match std::str::from_utf8(&b).ok().and_then(|s| Decimal::from_str(s).ok()) {
                Some(d) => Value::Decimal(d),
                None => Value::Bytes(b),
            }
        }
        ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_ENUM
        | ColumnType::MYSQL_TYPE_SET
        | ColumnType::MYSQL_TYPE_JSON => match String::from_utf8(b) {
            Ok(s) => Value::Str(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        _ => Value::Bytes(b),
    }
}

pub fn to_mysql_value(v: &Value) -> MyValue {
    match v {
        Value::Null => MyValue::NULL,
        Value::Bool(b) => MyValue::Int(i64::from(*b)),
        Value::I8(i) => MyValue::Int((*i).into()),
        Value::I16(i) => MyValue::Int((*i).into()),
        Value::I32(i) => MyValue::Int((*i).into()),
        Value::I64(i) => MyValue::Int(*i),
        Value::U8(u) => MyValue::UInt((*u).into()),
        Value::U16(u) => MyValue::UInt((*u).into()),
        Value::U32(u) => MyValue::UInt((*u).into()),
        Value::U64(u) => MyValue::UInt(*u),
        // Wider than the wire integers: sent as decimal text.
        Value::I128(i) => MyValue::Bytes(i.to_string().into_bytes()),
        Value::U128(u) => MyValue::Bytes(u.to_string().into_bytes()),
        Value::Decimal(d) => MyValue::Bytes(d.to_string().into_bytes()),
        Value::F32(f) => MyValue::Float(*f),
        Value::F64(f) => MyValue::Double(*f),
        Value::Str(s) => MyValue::Bytes(s.as_bytes().to_vec()),
        Value::Bytes(b) => MyValue::Bytes(b.clone()),
        Value::Date(d) => datetime_value(d.and_time(NaiveTime::default())),
        Value::Time(t) => MyValue::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1000,
        ),
        Value::DateTime(dt) => datetime_value(*dt),
        Value::DateTimeUtc(dt) => datetime_value(dt.naive_utc()),
        Value::List(_) | Value::Map(_) => MyValue::NULL,
    }
}

fn datetime_value(dt: NaiveDateTime) -> MyValue {
    MyValue::Date(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1000,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_column_keeps_date() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 27).unwrap();
        let wire = to_mysql_value(&Value::Date(date));
        assert_eq!(wire, MyValue::Date(2023, 10, 27, 0, 0, 0, 0));
        assert_eq!(
            from_mysql_value(wire, ColumnType::MYSQL_TYPE_DATE),
            Value::Date(date)
        );
    }

    #[test]
    fn test_datetime_column() {
        let dt = NaiveDate::from_ymd_opt(2023, 10, 27)
            .unwrap()
            .and_hms_micro_opt(12, 34, 56, 123456)
            .unwrap();
        let wire = to_mysql_value(&Value::DateTime(dt));
        assert_eq!(
            from_mysql_value(wire, ColumnType::MYSQL_TYPE_DATETIME),
            Value::DateTime(dt)
        );
        assert_eq!(
            from_mysql_value(
                MyValue::Date(0, 0, 0, 0, 0, 0, 0),
                ColumnType::MYSQL_TYPE_DATETIME
            ),
            Value::Null
        );
    }

    #[test]
    fn test_long_and_negative_times_stay_textual() {
        let t = NaiveTime::from_hms_micro_opt(1, 2, 3, 0).unwrap();
        assert_eq!(
            from_mysql_value(MyValue::Time(false, 0, 1, 2, 3, 0), ColumnType::MYSQL_TYPE_TIME),
            Value::Time(t)
        );
        assert_eq!(
            from_mysql_value(MyValue::Time(true, 1, 1, 2, 3, 0), ColumnType::MYSQL_TYPE_TIME),
            Value::Str("-25:02:03.000000".to_string())
        );
    }

    #[test]
    fn test_bytes_follow_column_type() {
        assert_eq!(
            from_mysql_value(MyValue::Bytes(b"9.99".to_vec()), ColumnType::MYSQL_TYPE_NEWDECIMAL),
            Value::Decimal(Decimal::new(999, 2))
        );
        assert_eq!(
            from_mysql_value(MyValue::Bytes(b"abc".to_vec()), ColumnType::MYSQL_TYPE_VAR_STRING),
            Value::Str("abc".to_string())
        );
        assert_eq!(
            from_mysql_value(MyValue::Bytes(vec![0xff]), ColumnType::MYSQL_TYPE_BLOB),
            Value::Bytes(vec![0xff])
        );
    }

    #[test]
    fn test_wide_integers_are_sent_as_text() {
        assert_eq!(
            to_mysql_value(&Value::U128(u128::MAX)),
            MyValue::Bytes(u128::MAX.to_string().into_bytes())
        );
        assert_eq!(from_mysql_value(MyValue::UInt(u64::MAX), ColumnType::MYSQL_TYPE_LONGLONG), Value::U64(u64::MAX));
    }
}
