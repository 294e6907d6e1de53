use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

/// How a raw text entry is interpreted at submit time
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    /// Free text spanning several lines; same coercion as `Text`
    MultiLine,
    Email,
    /// Digits only, at most `max_digits` of them
    Phone { max_digits: usize },
    Integer { min: Option<i64> },
    Decimal { min: Option<Decimal> },
    /// `YYYY-MM-DD`
    Date,
    /// Identifier picked from a previously loaded collection; blank means null
    ForeignKey,
    /// One of a fixed set of values, stored upper-case
    Choice(&'static [&'static str]),
    /// Comma separated integers within an inclusive range
    IntegerSet { min: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default raw value for an empty form
    pub fn default_value(&self) -> String {
        match &self.kind {
            FieldKind::Integer { .. } | FieldKind::Decimal { .. } if self.required => "0".to_string(),
            FieldKind::Choice(options) if self.required => options.first().map(|o| o.to_string()).unwrap_or_default(),
            _ => String::new(),
        }
    }

    /// Convert the raw entry into its payload value. Blank entries become
    /// `null`, or an error when the field is required.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        let raw = raw.trim();

        if is_blank(&self.kind, raw) {
            if self.required {
                return Err("This field is required.".to_string());
            }
            return Ok(match self.kind {
                FieldKind::IntegerSet { .. } => json!([]),
                _ => Value::Null,
            });
        }

        match &self.kind {
            FieldKind::Text | FieldKind::MultiLine => Ok(json!(raw)),
            FieldKind::Email => {
                let valid = raw
                    .split_once('@')
                    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'));
                if valid {
                    Ok(json!(raw))
                } else {
                    Err("Enter a valid email address.".to_string())
                }
            }
            FieldKind::Phone { max_digits } => {
                if !raw.chars().all(|c| c.is_ascii_digit()) {
                    Err("Only digits are allowed.".to_string())
                } else if raw.len() > *max_digits {
                    Err(format!("Ensure this field has no more than {} digits.", max_digits))
                } else {
                    Ok(json!(raw))
                }
            }
            FieldKind::Integer { min } => {
                let n: i64 = raw.parse().map_err(|_| "A valid integer is required.".to_string())?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("Ensure this value is greater than or equal to {}.", min));
                    }
                }
                Ok(json!(n))
            }
            FieldKind::Decimal { min } => {
                let d = Decimal::from_str(raw).map_err(|_| "A valid number is required.".to_string())?;
                if let Some(min) = min {
                    if d < *min {
                        return Err(format!("Ensure this value is greater than or equal to {}.", min));
                    }
                }
                Ok(json!(d.to_string()))
            }
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| json!(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| "Date has wrong format. Use YYYY-MM-DD.".to_string()),
            FieldKind::ForeignKey => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Ok(json!(id)),
                _ => Err(format!("Invalid pk \"{}\" - object does not exist.", raw)),
            },
            FieldKind::Choice(options) => options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(raw))
                .map(|o| json!(o))
                .ok_or_else(|| format!("\"{}\" is not a valid choice ({}).", raw, options.join(", "))),
            FieldKind::IntegerSet { min, max } => {
                let mut values = Vec::new();
                for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    let n: i64 = part
                        .parse()
                        .map_err(|_| format!("\"{}\" is not a valid integer.", part))?;
                    if n < *min || n > *max {
                        return Err(format!("{} is outside {}..={}.", n, min, max));
                    }
                    if !values.contains(&n) {
                        values.push(n);
                    }
                }
                values.sort_unstable();
                Ok(json!(values))
            }
        }
    }
}

/// "none"/"null" also mean unset for a foreign key selector
fn is_blank(kind: &FieldKind, raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }
    matches!(kind, FieldKind::ForeignKey) && (raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("null"))
}
