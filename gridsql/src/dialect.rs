//! SQL dialects and placeholder rebinding.
//!
//! The composer always writes the neutral `?` marker. Turning that into
//! executable SQL is two passes, in this order:
//!
//! 1. [`expand_in`] replaces the marker of every array argument with one marker
//!    per element and flattens the argument list;
//! 2. [`rebind`] numbers the markers the way the target database wants them.
//!
//! Expansion changes how many markers there are, so numbering must come last.
//! Both passes ignore `?` inside quoted literals, quoted identifiers and
//! comments.

use crate::constants::NEUTRAL_PLACEHOLDER;
use crate::value::Value;
use std::fmt;

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy + fmt::Debug + Send + Sync {
    /// Format the parameter placeholder for 1-based position `idx`.
    fn param(&self, idx: usize) -> String;

    /// LIKE keyword, optionally negated (`ilike` where supported).
    fn like_op(&self, negated: bool) -> &'static str;

    /// Clause declaring `\` as the LIKE escape character, with leading space.
    fn like_escape(&self) -> &'static str {
        r" escape '\'"
    }

    /// Short name, used in logs.
    fn name(&self) -> &'static str;
}

/// Postgres dialect: `$1, $2, ...`, case-insensitive `ilike`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    #[inline]
    fn like_op(&self, negated: bool) -> &'static str {
        if negated { "not ilike" } else { "ilike" }
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// `SQLite` dialect: `?1, ?2, ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    #[inline]
    fn like_op(&self, negated: bool) -> &'static str {
        // SQLite LIKE is case-insensitive for ASCII by default
        if negated { "not like" } else { "like" }
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

/// `MySQL` dialect: repeated `?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    #[inline]
    fn param(&self, _idx: usize) -> String {
        "?".to_string()
    }

    #[inline]
    fn like_op(&self, negated: bool) -> &'static str {
        if negated { "not like" } else { "like" }
    }

    // Backslash escapes inside MySQL string literals, so it has to be doubled.
    fn like_escape(&self) -> &'static str {
        r" escape '\\'"
    }

    fn name(&self) -> &'static str {
        "mysql"
    }
}

/// SQL Server dialect: `@p1, @p2, ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("@p{idx}")
    }

    #[inline]
    fn like_op(&self, negated: bool) -> &'static str {
        if negated { "not like" } else { "like" }
    }

    fn name(&self) -> &'static str {
        "sqlserver"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Quote(char),
    LineComment,
    BlockComment,
}

/// Walk `sql`, keeping the characters that are SQL code.
///
/// Quoted literals, quoted identifiers, `-- ...` line comments and `/* ... */`
/// block comments come back as spaces, so words on either side stay apart.
/// Byte offsets refer to `sql`.
fn lex(sql: &str) -> (Vec<(usize, char)>, Lex) {
    let mut out = Vec::with_capacity(sql.len());
    let mut state = Lex::Code;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match state {
            Lex::Code => match (c, next) {
                ('\'' | '"' | '`', _) => state = Lex::Quote(c),
                ('-', Some('-')) => {
                    chars.next();
                    state = Lex::LineComment;
                },
                ('/', Some('*')) => {
                    chars.next();
                    state = Lex::BlockComment;
                },
                _ => {
                    out.push((i, c));
                    continue;
                },
            },
            Lex::Quote(q) if c == q => state = Lex::Code,
            Lex::LineComment if c == '\n' => state = Lex::Code,
            Lex::BlockComment if c == '*' && next == Some('/') => {
                chars.next();
                state = Lex::Code;
            },
            Lex::Quote(_) | Lex::LineComment | Lex::BlockComment => {},
        }
        out.push((i, ' '));
    }
    (out, state)
}

/// Characters of `sql` outside quotes and comments, with their byte offsets.
pub(crate) fn code_chars(sql: &str) -> Vec<(usize, char)> {
    lex(sql).0
}

/// Whether `sql` ends inside an unterminated `--` comment.
pub(crate) fn ends_in_line_comment(sql: &str) -> bool {
    lex(sql).1 == Lex::LineComment
}

/// Split `sql` at every neutral placeholder outside quotes and comments.
///
/// The result always has one more segment than there are placeholders.
fn segments(sql: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;

    for (i, c) in code_chars(sql) {
        if c == NEUTRAL_PLACEHOLDER {
            parts.push(&sql[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&sql[start..]);
    parts
}

/// Number of neutral placeholders in `sql`, ignoring quoted text and comments.
pub fn count_placeholders(sql: &str) -> usize {
    segments(sql).len() - 1
}

/// Expand array arguments into one placeholder per element.
///
/// The n-th placeholder belongs to the n-th argument. An array argument with k
/// elements turns its placeholder into `?, ?, ...` (k markers) and contributes
/// its k elements, in order, to the returned argument list.
pub fn expand_in(sql: &str, args: Vec<Value>) -> (String, Vec<Value>) {
    if !args.iter().any(|a| matches!(a, Value::Array(_))) {
        return (sql.to_string(), args);
    }

    let parts = segments(sql);
    let mut out = String::with_capacity(sql.len() + args.len() * 3);
    let mut flat = Vec::with_capacity(args.len());
    let mut args = args.into_iter();

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            match args.next() {
                Some(Value::Array(items)) => {
                    for (j, item) in items.into_iter().enumerate() {
                        if j > 0 {
                            out.push_str(", ");
                        }
                        out.push(NEUTRAL_PLACEHOLDER);
                        flat.push(item);
                    }
                },
                Some(value) => {
                    out.push(NEUTRAL_PLACEHOLDER);
                    flat.push(value);
                },
                None => out.push(NEUTRAL_PLACEHOLDER),
            }
        }
        out.push_str(part);
    }
    flat.extend(args);

    (out, flat)
}

/// Rewrite neutral placeholders into `dialect`'s markers, numbered from 1.
pub fn rebind<D: Dialect>(dialect: &D, sql: &str) -> String {
    let parts = segments(sql);
    let mut out = String::with_capacity(sql.len() + parts.len() * 2);

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(&dialect.param(i));
        }
        out.push_str(part);
    }
    out
}
