//! Attribute value validators shared by resource schemas

use regex::Regex;
use std::sync::OnceLock;

fn resource_group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-A-Za-z0-9_.()]+$").expect("valid regex"))
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^P(\d+Y)?(\d+M)?(\d+W)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$")
            .expect("valid regex")
    })
}

/// Resource group names: at most 80 characters, no trailing period, and only
/// alphanumerics, `-`, `_`, `.`, `(` and `)`.
pub fn resource_group_name(value: &str) -> Result<(), String> {
    if value.len() > 80 {
        return Err("may not exceed 80 characters in length".to_string());
    }
    if value.ends_with('.') {
        return Err("may not end with a period".to_string());
    }
    if !resource_group_regex().is_match(value) {
        return Err(
            "may only contain alphanumeric characters, dash, underscores, parentheses and periods"
                .to_string(),
        );
    }
    Ok(())
}

/// ISO 8601 durations such as `PT5M`, `P14D` or `P1DT2H30.5S`
pub fn iso8601_duration(value: &str) -> Result<(), String> {
    // Every component is optional in the pattern, so a bare `P` or a dangling `T` still matches
    if value == "P" || value.ends_with('T') || !duration_regex().is_match(value) {
        return Err(format!(
            "expected {value:?} to be a valid ISO 8601 duration, e.g. PT5M or P1DT2H"
        ));
    }
    Ok(())
}
