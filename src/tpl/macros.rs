use std::collections::HashMap;
use std::fmt;

use log::trace;

use crate::Result;
use crate::error::DbError;
use crate::tpl::parser::{find_macro_site, parse_macro_arguments};
use crate::udbc::dialect::Dialect;

/// Accepted argument count of a macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{} or more", n),
        }
    }
}

/// Expands already split and trimmed arguments into SQL text.
pub type MacroFn = fn(&[String], Dialect) -> String;

/// A named macro usable as `NAME!(args)` inside templates.
#[derive(Debug, Clone, Copy)]
pub struct MacroDef {
    pub name: &'static str,
    pub arity: Arity,
    pub expand: MacroFn,
}

impl MacroDef {
    pub const fn new(name: &'static str, arity: Arity, expand: MacroFn) -> Self {
        Self {
            name,
            arity,
            expand,
        }
    }
}

/// Macro lookup table. The default table holds the built-in macros.
#[derive(Debug, Clone)]
pub struct MacroTable {
    defs: HashMap<&'static str, MacroDef>,
}

impl MacroTable {
    /// A table without any macro.
    pub fn empty() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }

    /// Adds a macro, replacing any previous one with the same name.
    pub fn register(&mut self, def: MacroDef) {
        self.defs.insert(def.name, def);
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.defs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.keys().copied()
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for def in BUILTIN_MACROS {
            table.register(*def);
        }
        table
    }
}

pub const BUILTIN_MACROS: &[MacroDef] = &[
    MacroDef::new("IF", Arity::Exact(3), expand_if),
    MacroDef::new("GT0", Arity::Exact(2), expand_gt0),
    MacroDef::new("MIN", Arity::AtLeast(2), expand_min),
    MacroDef::new("MAX", Arity::AtLeast(2), expand_max),
    MacroDef::new("ADDMONTH", Arity::Exact(2), expand_add_month),
];

fn expand_if(args: &[String], _dialect: Dialect) -> String {
    format!("CASE WHEN {} THEN {} ELSE {} END", args[0], args[1], args[2])
}

fn expand_gt0(args: &[String], _dialect: Dialect) -> String {
    format!("CASE WHEN {0} > 0 THEN {0} ELSE {1} END", args[0], args[1])
}

fn expand_min(args: &[String], dialect: Dialect) -> String {
    aggregate_of("MIN", args, dialect)
}

fn expand_max(args: &[String], dialect: Dialect) -> String {
    aggregate_of("MAX", args, dialect)
}

/// Aggregate over a derived one-column table built from the arguments.
fn aggregate_of(func: &str, args: &[String], dialect: Dialect) -> String {
    match dialect {
        Dialect::Named => {
            let rows = args
                .iter()
                .map(|a| format!("({})", a))
                .collect::<Vec<_>>()
                .join(",");
            format!("(SELECT {}(i) FROM (VALUES {}) AS T(i))", func, rows)
        }
        Dialect::Positional => {
            let mut rows = String::new();
            for (i, a) in args.iter().enumerate() {
                if i == 0 {
                    rows.push_str(&format!("SELECT {} AS i", a));
                } else {
                    rows.push_str(&format!(" UNION SELECT {}", a));
                }
            }
            format!("(SELECT {}(v.i) FROM ({}) v)", func, rows)
        }
    }
}

fn expand_add_month(args: &[String], dialect: Dialect) -> String {
    match dialect {
        Dialect::Named => format!("DATEADD(month, {}, {})", args[1], args[0]),
        Dialect::Positional => format!("DATE_ADD({}, INTERVAL {} MONTH)", args[0], args[1]),
    }
}

/// Expands every macro call in `template`, leftmost first, until none is left.
///
/// Macro output is scanned again, so a macro may expand into further calls.
/// More than `limit` substitutions fail with [`DbError::MacroExpansionLimit`].
pub fn expand(template: &str, dialect: Dialect, macros: &MacroTable, limit: usize) -> Result<String> {
    let mut text = template.to_string();
    let mut from = 0;
    let mut count = 0;

    while let Some(site) = find_macro_site(&text, from) {
        let name = site.name.to_string();
        let (start, args_start) = (site.start, site.args_start);
        let def = macros
            .get(&name)
            .ok_or_else(|| DbError::UnknownMacro { name: name.clone() })?;

        let (consumed, args) = parse_macro_arguments(&text[args_start..])
            .ok_or_else(|| DbError::UnclosedMacro { name: name.clone() })?;

        if !def.arity.accepts(args.len()) {
            return Err(DbError::MacroArity {
                name,
                expected: def.arity,
                got: args.len(),
            });
        }

        count += 1;
        if count > limit {
            return Err(DbError::MacroExpansionLimit { limit });
        }

        let replacement = (def.expand)(&args, dialect);
        trace!("expand {}!({}) -> {}", name, args.join(", "), replacement);

        text.replace_range(start..args_start + consumed, &replacement);
        from = resume_point(&text, start);
    }

    Ok(text)
}

/// Where to scan again after a substitution at `start`. Text before `start`
/// holds no call site, except a `NAME!` that the replacement may complete
/// with a leading `(`.
fn resume_point(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    if start == 0 || bytes[start - 1] != b'!' {
        return start;
    }
    let mut i = start - 1;
    while i > 0 && (bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_') {
        i -= 1;
    }
    i
}
