//! Content line types (RFC 5545 §3.1).

/// A property parameter (`;NAME=value[,value]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// One lexed `NAME;PARAMS:VALUE` line.
///
/// Parameters do not change how a value is read; `TZID` is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Uppercased.
    pub name: String,
    pub params: Vec<Parameter>,
    /// Unfolded but still escaped.
    pub raw_value: String,
}

impl ContentLine {
    /// First value of the named parameter, matched case-insensitively.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }

    /// Whether this is `BEGIN:<component>` or `END:<component>` for `marker`.
    #[must_use]
    pub fn is_boundary(&self, marker: &str, component: &str) -> bool {
        self.name == marker && self.raw_value.trim().eq_ignore_ascii_case(component)
    }
}
