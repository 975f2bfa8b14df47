//! Small helpers shared by the application modules.

/// True for empty or whitespace-only input.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Names of the required fields whose values are blank, in the given order.
pub fn blank_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| *name)
        .collect()
}
