use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw value stored in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Text view of the value, used to seed text drafts
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_plain_number(*n),
            CellValue::Boolean(b) => b.to_string(),
        }
    }

    /// Numeric view of the value. Non-numeric text coerces to 0.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            CellValue::Boolean(b) => if *b { 1.0 } else { 0.0 },
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            CellValue::Boolean(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "t"
            ),
        }
    }

    /// Coerce into the representation a column of `kind` stores
    pub fn coerce(&self, kind: ColumnKind) -> CellValue {
        match kind {
            ColumnKind::Text | ColumnKind::Popper => CellValue::Text(self.as_text()),
            ColumnKind::Number => CellValue::Number(self.as_number()),
            ColumnKind::Boolean => CellValue::Boolean(self.as_bool()),
        }
    }

    /// Default committed value for a missing key
    pub fn empty(kind: ColumnKind) -> CellValue {
        match kind {
            ColumnKind::Text | ColumnKind::Popper => CellValue::Text(String::new()),
            ColumnKind::Number => CellValue::Number(0.0),
            ColumnKind::Boolean => CellValue::Boolean(false),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

/// Render a number without trailing ".0" for whole values (42.0 -> "42")
pub fn format_plain_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Boolean,
    Popper,
}

impl ColumnKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Popper => "popper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    Currency,
    Percentage,
    Decimal,
}
