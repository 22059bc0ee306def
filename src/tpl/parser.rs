//! Hand-written scanners for the two template mini-languages: macro calls
//! `NAME!(args)` and bracket references `[!Model.field]`, plus the canonical
//! `@pN` parameter references.

/// A macro call site found in the template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MacroSite<'a> {
    /// Macro name, as written.
    pub name: &'a str,
    /// Byte offset of the first character of the name.
    pub start: usize,
    /// Byte offset just past the opening parenthesis.
    pub args_start: usize,
}

/// A bracket reference `[name]`, `[name.field]` or `[!name.field]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BracketRef<'a> {
    /// `true` when the `!` prefix requests the table-qualified form.
    pub qualified: bool,
    pub model: &'a str,
    pub field: Option<&'a str>,
    /// Byte length of the whole span, brackets included.
    pub len: usize,
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the identifier `[A-Za-z_][A-Za-z0-9_]*` at the start of `bytes`.
fn ident_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {
            1 + bytes[1..].iter().take_while(|b| is_word(**b)).count()
        }
        _ => 0,
    }
}

/// Finds the leftmost `NAME!(` at or after `from` whose name starts on a word
/// boundary. Names start with a letter and continue with letters, digits or `_`.
pub(crate) fn find_macro_site(text: &str, from: usize) -> Option<MacroSite<'_>> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_alphabetic() || (i > 0 && is_word(bytes[i - 1])) {
            i += 1;
            continue;
        }

        let end = i + ident_len(&bytes[i..]);
        if bytes[end..].starts_with(b"!(") {
            return Some(MacroSite {
                name: &text[i..end],
                start: i,
                args_start: end + 2,
            });
        }
        // Skip the rest of the word: no call can start inside it.
        i = end;
    }
    None
}

/// Splits a macro argument list. `text` starts right after the opening
/// parenthesis. Commas split arguments only at paren depth 0, and the
/// closing parenthesis at depth 0 ends the call.
///
/// Returns the consumed byte length (closing parenthesis included) and the
/// trimmed arguments, or `None` when the list is never closed.
pub(crate) fn parse_macro_arguments(text: &str) -> Option<(usize, Vec<String>)> {
    let mut args = Vec::new();
    let mut arg_start = 0;
    let mut depth = 0usize;

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                args.push(text[arg_start..i].trim().to_string());
                return Some((i + 1, args));
            }
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(text[arg_start..i].trim().to_string());
                arg_start = i + 1;
            }
            _ => {}
        }
    }
    None
}

/// Parses a bracket reference at the start of `text` (which begins with `[`).
pub(crate) fn parse_bracket_ref(text: &str) -> Option<BracketRef<'_>> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let mut pos = 1;
    let qualified = bytes.get(pos) == Some(&b'!');
    if qualified {
        pos += 1;
    }

    let model_len = ident_len(&bytes[pos..]);
    if model_len == 0 {
        return None;
    }
    let model = &text[pos..pos + model_len];
    pos += model_len;

    let mut field = None;
    if bytes.get(pos) == Some(&b'.') {
        let field_len = ident_len(&bytes[pos + 1..]);
        if field_len == 0 {
            return None;
        }
        field = Some(&text[pos + 1..pos + 1 + field_len]);
        pos += 1 + field_len;
    }

    if bytes.get(pos) != Some(&b']') {
        return None;
    }

    Some(BracketRef {
        qualified,
        model,
        field,
        len: pos + 1,
    })
}

/// Parses a numbered parameter reference `@pN` at the start of `text`.
///
/// Returns the parameter number and the byte length of the reference.
/// Numbers too large for `usize` saturate, so they are reported as out of range.
pub(crate) fn parse_param_ref(text: &str) -> Option<(usize, usize)> {
    let digits = text.strip_prefix("@p")?;
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let number = digits[..len].parse::<usize>().unwrap_or(usize::MAX);
    Some((number, len + 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_macro_site() {
        let site = find_macro_site("SELECT IF!(a, b, c)", 0).unwrap();
        assert_eq!(site.name, "IF");
        assert_eq!(site.start, 7);
        assert_eq!(site.args_start, 11);
    }

    #[test]
    fn test_macro_site_at_start_of_text() {
        let site = find_macro_site("GT0!(x, 1)", 0).unwrap();
        assert_eq!(site.name, "GT0");
        assert_eq!(site.start, 0);
    }

    #[test]
    fn test_macro_site_needs_word_boundary() {
        assert_eq!(find_macro_site("xIF!(a)", 0).map(|s| s.name), None);
        assert_eq!(find_macro_site("_IF!(a)", 0).map(|s| s.name), None);
        assert_eq!(find_macro_site("1IF!(a)", 0).map(|s| s.name), None);
        assert_eq!(find_macro_site("(IF!(a)", 0).map(|s| s.name), Some("IF"));
    }

    #[test]
    fn test_macro_site_ignores_plain_text() {
        assert!(find_macro_site("a != b AND NOT (c)", 0).is_none());
        assert!(find_macro_site("IF (a)", 0).is_none());
        assert!(find_macro_site("IF!a", 0).is_none());
    }

    #[test]
    fn test_parse_arguments_flat() {
        let (len, args) = parse_macro_arguments(" a ,b,  c ) tail").unwrap();
        assert_eq!(args, vec!["a", "b", "c"]);
        assert_eq!(len, 11);
    }

    #[test]
    fn test_parse_arguments_nested() {
        let text = "COALESCE(a, 0), GT0!(x, (1 + 2)), f(g(h, i))) rest";
        let (len, args) = parse_macro_arguments(text).unwrap();
        assert_eq!(args, vec!["COALESCE(a, 0)", "GT0!(x, (1 + 2))", "f(g(h, i))"]);
        assert_eq!(&text[len..], " rest");
    }

    #[test]
    fn test_parse_arguments_empty_and_unclosed() {
        assert_eq!(parse_macro_arguments(")").unwrap(), (1, vec![String::new()]));
        assert!(parse_macro_arguments("a, (b)").is_none());
    }

    #[test]
    fn test_parse_arguments_multibyte() {
        let (len, args) = parse_macro_arguments("'é', 'ü') x").unwrap();
        assert_eq!(args, vec!["'é'", "'ü'"]);
        assert_eq!(len, "'é', 'ü')".len());
    }

    #[test]
    fn test_parse_bracket_ref() {
        assert_eq!(
            parse_bracket_ref("[User] x"),
            Some(BracketRef {
                qualified: false,
                model: "User",
                field: None,
                len: 6
            })
        );
        assert_eq!(
            parse_bracket_ref("[!User.name]"),
            Some(BracketRef {
                qualified: true,
                model: "User",
                field: Some("name"),
                len: 12
            })
        );
        assert!(parse_bracket_ref("[1, 2]").is_none());
        assert!(parse_bracket_ref("[User.]").is_none());
        assert!(parse_bracket_ref("[User").is_none());
        assert!(parse_bracket_ref("[a.b.c]").is_none());
    }

    #[test]
    fn test_parse_param_ref() {
        assert_eq!(parse_param_ref("@p12, x"), Some((12, 4)));
        assert_eq!(parse_param_ref("@px"), None);
        assert_eq!(parse_param_ref("@p"), None);
        assert_eq!(
            parse_param_ref("@p99999999999999999999999"),
            Some((usize::MAX, 25))
        );
    }
}
