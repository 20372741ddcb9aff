use serde_json::{Number, Value};

/// What kind of input a field takes in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    Date,
    Url,
    Email,
    Choice(&'static [&'static str]),
    /// Binary attachment; never pre-filled from server data
    File,
    /// Draft-only "still ongoing" checkbox. Derived from `clears` being blank,
    /// never sent, and forces `clears` to null when set.
    CurrentFlag { clears: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Empty,
    Text(&'static str),
    Number(i64),
    Bool(bool),
    Unset,
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Empty => Value::String(String::new()),
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Number(n) => Value::from(n),
            FieldDefault::Bool(b) => Value::Bool(b),
            FieldDefault::Unset => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, default: FieldDefault::Empty }
    }

    pub const fn long_text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::LongText, default: FieldDefault::Empty }
    }

    pub const fn url(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Url, default: FieldDefault::Empty }
    }

    pub const fn email(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Email, default: FieldDefault::Empty }
    }

    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Date, default: FieldDefault::Empty }
    }

    pub const fn number(name: &'static str, default: i64) -> Self {
        Self { name, kind: FieldKind::Number, default: FieldDefault::Number(default) }
    }

    pub const fn choice(name: &'static str, options: &'static [&'static str], default: &'static str) -> Self {
        Self { name, kind: FieldKind::Choice(options), default: FieldDefault::Text(default) }
    }

    pub const fn file(name: &'static str) -> Self {
        Self { name, kind: FieldKind::File, default: FieldDefault::Unset }
    }

    pub const fn current_flag(name: &'static str, clears: &'static str) -> Self {
        Self { name, kind: FieldKind::CurrentFlag { clears }, default: FieldDefault::Bool(false) }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, FieldKind::File)
    }

    /// Draft-only fields are never part of the outbound payload
    pub fn is_draft_only(&self) -> bool {
        matches!(self.kind, FieldKind::CurrentFlag { .. })
    }

    /// Convert command-line text into the value this field expects
    pub fn coerce(&self, raw: &str) -> Value {
        match self.kind {
            FieldKind::Number => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .ok()
                .or_else(|| raw.trim().parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number))
                .unwrap_or_else(|| Value::String(raw.to_string())),
            FieldKind::CurrentFlag { .. } => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Value::Bool(true),
                "false" | "no" | "0" | "off" | "" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            FieldKind::Choice(_) => Value::String(raw.trim().to_ascii_uppercase()),
            _ => Value::String(raw.to_string()),
        }
    }

    /// Reject values the form control could never produce
    pub fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            FieldKind::File => false,
            FieldKind::CurrentFlag { .. } => value.is_boolean(),
            FieldKind::Number => value.is_number() || value.is_null(),
            FieldKind::Choice(options) => value
                .as_str()
                .map(|s| options.contains(&s))
                .unwrap_or(false),
            _ => value.is_string() || value.is_null(),
        }
    }
}
