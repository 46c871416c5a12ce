//! Single `property: value` declarations.

/// A declaration with its value kept as authored.
///
/// Values are not interpreted: whatever the sheet says is written into the
/// element's `style` attribute unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lower-cased property name (custom properties keep their case).
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Build a declaration from a property name and the raw value text,
    /// splitting off a trailing `!important`. Returns `None` for an empty
    /// name or value.
    pub fn from_raw(name: &str, raw: &str) -> Option<Self> {
        let name = name.trim();
        let property = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };

        let (value, important) = split_important(raw.trim());
        if property.is_empty() || value.is_empty() {
            return None;
        }

        Some(Self {
            property,
            value: value.to_string(),
            important,
        })
    }

    /// `property: value`, without the importance flag.
    pub fn to_css(&self) -> String {
        format!("{}: {}", self.property, self.value)
    }
}

fn split_important(value: &str) -> (&str, bool) {
    const IMPORTANT: &str = "important";

    let Some(split) = value.len().checked_sub(IMPORTANT.len()) else {
        return (value, false);
    };
    if !value.is_char_boundary(split) || !value[split..].eq_ignore_ascii_case(IMPORTANT) {
        return (value, false);
    }
    match value[..split].trim_end().strip_suffix('!') {
        Some(rest) => (rest.trim_end(), true),
        None => (value, false),
    }
}

/// Join declarations into a `style` attribute value.
pub fn to_style_attribute(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(Declaration::to_css)
        .collect::<Vec<_>>()
        .join("; ")
}
