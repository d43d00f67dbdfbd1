//! `$select` and `$expand` option parsing.

use crate::executor::SelectSet;

/// Parse a comma-separated `$select` list.
///
/// Absent, blank or `*` selects every field. Blank items are skipped.
pub fn parse_select(raw: Option<&str>) -> SelectSet {
    let Some(raw) = raw else {
        return SelectSet::all();
    };

    let names: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    if names.contains(&"*") {
        return SelectSet::all();
    }

    SelectSet::from_names(names)
}

/// Parse a comma-separated `$expand` list into relation names
pub fn parse_expand(raw: Option<&str>) -> Vec<String> {
    let mut relations: Vec<String> = Vec::new();
    for name in raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        if !relations.iter().any(|r| r == name) {
            relations.push(name.to_string());
        }
    }
    relations
}
