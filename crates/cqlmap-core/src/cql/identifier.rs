use crate::error::{ErrorOrigin, InternalError};
use std::fmt;

///
/// RESERVED_KEYWORDS
///
/// CQL keywords that can never appear as unquoted identifiers.
/// Kept sorted for binary search.
///

const RESERVED_KEYWORDS: &[&str] = &[
    "ADD",
    "ALLOW",
    "ALTER",
    "AND",
    "APPLY",
    "ASC",
    "AUTHORIZE",
    "BATCH",
    "BEGIN",
    "BY",
    "COLUMNFAMILY",
    "CREATE",
    "DELETE",
    "DESC",
    "DESCRIBE",
    "DROP",
    "ENTRIES",
    "EXECUTE",
    "FROM",
    "FULL",
    "GRANT",
    "IF",
    "IN",
    "INDEX",
    "INFINITY",
    "INSERT",
    "INTO",
    "KEYSPACE",
    "LIMIT",
    "MODIFY",
    "NAN",
    "NORECURSIVE",
    "NOT",
    "NULL",
    "OF",
    "ON",
    "OR",
    "ORDER",
    "PRIMARY",
    "RENAME",
    "REPLACE",
    "REVOKE",
    "SCHEMA",
    "SELECT",
    "SET",
    "TABLE",
    "TO",
    "TOKEN",
    "TRUNCATE",
    "UNLOGGED",
    "UPDATE",
    "USE",
    "USING",
    "WHERE",
    "WITH",
];

///
/// CqlIdentifier
///
/// Store identifier for tables, columns and user types.
///
/// Unquoted identifiers are case-insensitive and stored folded to lower case.
/// Quoted identifiers preserve case and render wrapped in double quotes with
/// embedded quotes doubled.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CqlIdentifier {
    text: String,
    quoted: bool,
}

impl CqlIdentifier {
    /// Build an identifier, quoting only when the store requires it.
    ///
    /// Input that is already wrapped in double quotes is taken as a quoted
    /// identifier verbatim.
    pub fn cql_id(text: impl AsRef<str>) -> Result<Self, InternalError> {
        let text = text.as_ref();
        require_text(text)?;

        if let Some(inner) = strip_quotes(text) {
            require_text(inner)?;

            return Ok(Self {
                text: inner.replace("\"\"", "\""),
                quoted: true,
            });
        }

        if Self::is_unquoted_legal(text) {
            Ok(Self {
                text: text.to_ascii_lowercase(),
                quoted: false,
            })
        } else {
            Ok(Self {
                text: text.to_string(),
                quoted: true,
            })
        }
    }

    /// Build an identifier that is always quoted (case-sensitive).
    pub fn quoted(text: impl AsRef<str>) -> Result<Self, InternalError> {
        let text = text.as_ref();
        require_text(text)?;

        Ok(Self {
            text: text.to_string(),
            quoted: true,
        })
    }

    /// True when `text` may be used without quotes.
    #[must_use]
    pub fn is_unquoted_legal(text: &str) -> bool {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };

        first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !is_reserved(text)
    }

    /// Identifier text without quotes (lower-cased when unquoted).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Render the identifier exactly as it appears in a statement.
    #[must_use]
    pub fn to_cql(&self) -> String {
        if self.quoted {
            format!("\"{}\"", self.text.replace('"', "\"\""))
        } else {
            self.text.clone()
        }
    }
}

impl fmt::Display for CqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql())
    }
}

fn require_text(text: &str) -> Result<(), InternalError> {
    if text.trim().is_empty() {
        return Err(InternalError::invalid_argument(
            ErrorOrigin::Identifier,
            "identifier must not be empty",
        ));
    }

    Ok(())
}

fn strip_quotes(text: &str) -> Option<&str> {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

fn is_reserved(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();

    RESERVED_KEYWORDS.binary_search(&upper.as_str()).is_ok()
}
