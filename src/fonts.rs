//! Installed font discovery through fontconfig.

use std::collections::BTreeSet;
use std::process::Command;

use crate::error::{Result, Stage};
use crate::media::tools::capture_tool;

/// Family names from `fc-list : family` output, sorted and deduplicated.
///
/// A line can carry several comma-separated names for one family.
pub fn parse_families(output: &str) -> Vec<String> {
    output
        .lines()
        .flat_map(|line| line.split(','))
        .map(|name| name.trim().replace("\\-", "-"))
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn list_font_families() -> Result<Vec<String>> {
    let output = capture_tool(Stage::Render, Command::new("fc-list").args([":", "family"]))?;
    Ok(parse_families(&output))
}

/// Families whose name contains `filter`, ignoring case.
pub fn filter_families<'a>(families: &'a [String], filter: &str) -> Vec<&'a String> {
    let needle = filter.to_lowercase();
    families
        .iter()
        .filter(|family| family.to_lowercase().contains(&needle))
        .collect()
}

/// Whether any installed family name contains `font_name`, ignoring case.
pub fn is_font_available(families: &[String], font_name: &str) -> bool {
    !filter_families(families, font_name).is_empty()
}
