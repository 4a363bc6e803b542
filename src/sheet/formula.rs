use crate::normalize::{normalize_date_input, DateInput, NormalizeError};
use std::str::FromStr;

/// Worksheet functions the add-in knows how to insert
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormulaKind {
    /// Full history as a spilled `Date | Value` array
    #[default]
    Array,
    Latest,
    /// Year-over-year change
    Yoy,
    /// Value on one date (`YYYY-MM-DD`)
    Value { date: String },
    /// One metadata field, e.g. `title`
    Meta { field: String },
}

impl FormulaKind {
    pub fn function_name(&self) -> &'static str {
        match self {
            FormulaKind::Array => "DSIQ",
            FormulaKind::Latest => "DSIQ_LATEST",
            FormulaKind::Yoy => "DSIQ_YOY",
            FormulaKind::Value { .. } => "DSIQ_VALUE",
            FormulaKind::Meta { .. } => "DSIQ_META",
        }
    }

    /// `DSIQ_VALUE` with its date normalized to `YYYY-MM-DD`
    pub fn value_at(date: &DateInput) -> Result<Self, NormalizeError> {
        Ok(FormulaKind::Value {
            date: normalize_date_input(date)?,
        })
    }

    /// Parse a kind name plus its optional argument (`value 2024-01-01`, `meta title`)
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self, String> {
        let arg = arg.map(str::trim).filter(|a| !a.is_empty());
        match (name.parse::<FormulaKind>()?, arg) {
            (FormulaKind::Value { .. }, Some(date)) => {
                Self::value_at(&DateInput::from(date)).map_err(|e| e.to_string())
            }
            (FormulaKind::Meta { .. }, Some(field)) => Ok(FormulaKind::Meta {
                field: field.to_string(),
            }),
            (FormulaKind::Value { .. }, None) => Err("DSIQ_VALUE needs a date".to_string()),
            (FormulaKind::Meta { .. }, None) => Err("DSIQ_META needs a field name".to_string()),
            (kind, _) => Ok(kind),
        }
    }
}

/// Accepts short names (`latest`) and function names (`DSIQ_LATEST`), any case.
/// `Value` and `Meta` come back with an empty argument.
impl FromStr for FormulaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("dsiq_").unwrap_or(&lower);
        match name {
            "array" | "dsiq" => Ok(FormulaKind::Array),
            "latest" => Ok(FormulaKind::Latest),
            "yoy" => Ok(FormulaKind::Yoy),
            "value" => Ok(FormulaKind::Value { date: String::new() }),
            "meta" => Ok(FormulaKind::Meta { field: String::new() }),
            _ => Err(format!("Unknown formula: {}", s.trim())),
        }
    }
}

/// Build `=FN("series_id", ...)` with every argument as a string literal
pub fn build_formula(series_id: &str, kind: &FormulaKind) -> String {
    let mut args = vec![quote(series_id)];
    match kind {
        FormulaKind::Value { date } => args.push(quote(date)),
        FormulaKind::Meta { field } => args.push(quote(field)),
        _ => {}
    }
    format!("={}({})", kind.function_name(), args.join(", "))
}

/// Spreadsheet string literal: embedded quotes are doubled
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
