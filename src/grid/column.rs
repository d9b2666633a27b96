use std::fmt;
use std::rc::Rc;

use super::table::Row;
use super::value::{CellValue, ColumnKind, NumberFormat};

pub const DEFAULT_TRIGGER_TEXT: &str = "View";

pub type RowFn = Rc<dyn Fn(&Row) -> CellValue>;

/// Derives a display value from the whole row instead of a direct key lookup
#[derive(Clone)]
pub enum Accessor {
    /// `"{first} {last}"` style template over other keys of the row
    Template(String),
    Func(RowFn),
}

impl Accessor {
    pub fn derive(&self, row: &Row) -> CellValue {
        match self {
            Accessor::Template(template) => CellValue::Text(expand_template(template, row)),
            Accessor::Func(f) => f(row),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Accessor::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Expand `{key}` placeholders with the row's values. Unknown keys expand to
/// nothing; `{{` and `}}` are literal braces.
fn expand_template(template: &str, row: &Row) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    out.push('{');
                    out.push_str(&key);
                } else if let Some(value) = row.get(key.trim()) {
                    out.push_str(&value.as_text());
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Definition of one grid column
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: String,
    pub header: String,
    pub kind: ColumnKind,
    pub format: Option<NumberFormat>,
    pub trigger_text: Option<String>,
    pub accessor: Option<Accessor>,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>, header: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            kind,
            format: None,
            trigger_text: None,
            accessor: None,
        }
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_trigger(mut self, text: impl Into<String>) -> Self {
        self.trigger_text = Some(text.into());
        self
    }

    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn trigger_label(&self) -> &str {
        self.trigger_text.as_deref().unwrap_or(DEFAULT_TRIGGER_TEXT)
    }

    /// Derived scalar columns have nothing to write back to, so they never
    /// enter edit mode. Popper columns only disclose and stay usable.
    pub fn is_editable(&self) -> bool {
        self.accessor.is_none() || self.kind == ColumnKind::Popper
    }

    /// Value shown for `row`: the accessor if present, otherwise the key
    pub fn value_of(&self, row: &Row) -> CellValue {
        match &self.accessor {
            Some(accessor) => accessor.derive(row),
            None => row
                .get(&self.key)
                .map(|v| v.coerce(self.kind))
                .unwrap_or_else(|| CellValue::empty(self.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_template_expansion() {
        let r = row(&[("first", "Ada".into()), ("last", "Lovelace".into()), ("age", 36.0.into())]);
        assert_eq!(expand_template("{first} {last}", &r), "Ada Lovelace");
        assert_eq!(expand_template("{first} ({age})", &r), "Ada (36)");
        assert_eq!(expand_template("{{literal}}", &r), "{literal}");
        assert_eq!(expand_template("{missing}!", &r), "!");
        assert_eq!(expand_template("open {brace", &r), "open {brace");
    }

    #[test]
    fn test_value_of_prefers_accessor() {
        let r = row(&[("a", 2.0.into()), ("b", 3.0.into())]);
        let sum: RowFn = Rc::new(|row: &Row| {
            let a = row.get("a").map(|v| v.as_number()).unwrap_or(0.0);
            let b = row.get("b").map(|v| v.as_number()).unwrap_or(0.0);
            CellValue::Number(a + b)
        });
        let col = ColumnDef::new("sum", "Sum", ColumnKind::Number).with_accessor(Accessor::Func(sum));
        assert_eq!(col.value_of(&r), CellValue::Number(5.0));
        assert!(!col.is_editable());
    }

    #[test]
    fn test_value_of_coerces_and_defaults() {
        let r = row(&[("n", "12".into())]);
        let col = ColumnDef::new("n", "N", ColumnKind::Number);
        assert_eq!(col.value_of(&r), CellValue::Number(12.0));

        let missing = ColumnDef::new("flag", "Flag", ColumnKind::Boolean);
        assert_eq!(missing.value_of(&r), CellValue::Boolean(false));
    }

    #[test]
    fn test_trigger_label_default() {
        let col = ColumnDef::new("d", "Details", ColumnKind::Popper);
        assert_eq!(col.trigger_label(), "View");
        assert_eq!(col.with_trigger("Open").trigger_label(), "Open");
    }
}
