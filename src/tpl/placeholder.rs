use crate::Result;
use crate::error::DbError;
use crate::tpl::parser::parse_param_ref;
use crate::udbc::dialect::Dialect;
use crate::udbc::value::Value;

/// Numbers every `?` as `@p1`, `@p2`, ... from left to right.
pub fn normalize_placeholders(template: &str) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut seq = 0;
    for c in template.chars() {
        if c == '?' {
            seq += 1;
            out.push_str("@p");
            out.push_str(&seq.to_string());
        } else {
            out.push(c);
        }
    }
    out
}

/// Adapts `@pN` references to `dialect`.
///
/// The named dialect keeps text and arguments as they are. The positional
/// dialect replaces each reference with `?` and lists `args[N-1]` once per
/// reference, in reference order. Every `N` must lie in `1..=args.len()`.
pub fn rebind(sql: &str, args: Vec<Value>, dialect: Dialect) -> Result<(String, Vec<Value>)> {
    let mut out = String::with_capacity(sql.len());
    let mut ordered = Vec::with_capacity(args.len());
    let mut rest = sql;

    while let Some(pos) = rest.find("@p") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some((index, len)) = parse_param_ref(rest) else {
            out.push_str("@p");
            rest = &rest[2..];
            continue;
        };
        if index == 0 || index > args.len() {
            return Err(DbError::ParameterRange {
                index,
                len: args.len(),
            });
        }

        match dialect {
            Dialect::Named => out.push_str(&rest[..len]),
            Dialect::Positional => {
                out.push_str(&dialect.placeholder(ordered.len() + 1));
                ordered.push(args[index - 1].clone());
            }
        }
        rest = &rest[len..];
    }
    out.push_str(rest);

    match dialect {
        Dialect::Named => Ok((out, args)),
        Dialect::Positional => Ok((out, ordered)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i32]) -> Vec<Value> {
        values.iter().map(|v| Value::I32(*v)).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_placeholders("a = ? AND b IN (?, ?)"),
            "a = @p1 AND b IN (@p2, @p3)"
        );
        assert_eq!(normalize_placeholders("no params"), "no params");
    }

    #[test]
    fn test_rebind_positional_reorders() {
        let (sql, args) = rebind(
            "x = @p2 OR y = @p1 OR z = @p2",
            ints(&[10, 20]),
            Dialect::Positional,
        )
        .unwrap();
        assert_eq!(sql, "x = ? OR y = ? OR z = ?");
        assert_eq!(args, ints(&[20, 10, 20]));
    }

    #[test]
    fn test_rebind_named_is_identity() {
        let (sql, args) = rebind("x = @p2 OR y = @p1", ints(&[10, 20]), Dialect::Named).unwrap();
        assert_eq!(sql, "x = @p2 OR y = @p1");
        assert_eq!(args, ints(&[10, 20]));
    }

    #[test]
    fn test_rebind_multi_digit_reference() {
        let args: Vec<Value> = (1..=12).map(Value::I32).collect();
        let (sql, out) = rebind("a = @p12 AND b = @p1", args, Dialect::Positional).unwrap();
        assert_eq!(sql, "a = ? AND b = ?");
        assert_eq!(out, ints(&[12, 1]));
    }

    #[test]
    fn test_rebind_out_of_range() {
        for dialect in [Dialect::Positional, Dialect::Named] {
            let err = rebind("a = @p3", ints(&[1, 2]), dialect).unwrap_err();
            assert!(matches!(err, DbError::ParameterRange { index: 3, len: 2 }));

            let err = rebind("a = @p0", ints(&[1]), dialect).unwrap_err();
            assert!(matches!(err, DbError::ParameterRange { index: 0, len: 1 }));
        }
    }

    #[test]
    fn test_rebind_ignores_non_references() {
        let (sql, args) = rebind("SELECT '@pattern', @p1", ints(&[7]), Dialect::Positional).unwrap();
        assert_eq!(sql, "SELECT '@pattern', ?");
        assert_eq!(args, ints(&[7]));
    }
}
