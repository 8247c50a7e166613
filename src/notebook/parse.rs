//! Parsers for the text `nb` prints.
//!
//! Keeping every pattern here means a change in `nb`'s output format only
//! touches this file.

use std::sync::LazyLock;

use regex::Regex;

use super::NotebookItem;

/// `[notebook:index] filename title`, as printed by `show --info`
static INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[[^:\]]+:\d+\]\s+(\S+)\s+(?:·\s+)?(.*?)\s*$"#).expect("valid info regex")
});

/// `[index] filename · "title"`
static LOCAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*(\d+)\s*\]\s+(.*?)\s+·\s+"(.*)"$"#).expect("valid listing regex")
});

/// `[notebook:index] filename · "title"`
static CROSS_NOTEBOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([^:\]]+):\s*(\d+)\s*\]\s+(.*?)\s+·\s+"(.*)"$"#)
        .expect("valid search listing regex")
});

/// Shape of a listing line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    /// `list` output within one notebook
    Local,
    /// `search` output, which prefixes the notebook name
    CrossNotebook,
}

/// Extract `(filename, title)` from `show --info` output.
///
/// Returns `None` when the header is not recognisable.
pub fn parse_info(output: &str) -> Option<(String, String)> {
    let line = output.trim().lines().next()?.trim();
    let caps = INFO_RE.captures(line)?;
    let filename = caps.get(1)?.as_str().trim().to_string();
    let title = unquote(caps.get(2)?.as_str().trim()).trim().to_string();
    Some((filename, title))
}

/// Parse a single listing line, or `None` if it does not match `format`
pub fn parse_line(line: &str, format: ListingFormat) -> Option<NotebookItem> {
    let line = line.trim();
    let (id, filename, title) = match format {
        ListingFormat::Local => {
            let caps = LOCAL_RE.captures(line)?;
            (caps.get(1)?, caps.get(2)?, caps.get(3)?)
        }
        ListingFormat::CrossNotebook => {
            let caps = CROSS_NOTEBOOK_RE.captures(line)?;
            (caps.get(2)?, caps.get(3)?, caps.get(4)?)
        }
    };

    let id = id.as_str().trim().parse::<u64>().ok()?;
    Some(NotebookItem {
        id,
        filename: filename.as_str().trim().to_string(),
        title: title.as_str().trim().to_string(),
    })
}

/// Parse every matching line, preserving order and skipping the rest
pub fn parse_listing(output: &str, format: ListingFormat) -> Vec<NotebookItem> {
    output
        .lines()
        .filter_map(|line| parse_line(line, format))
        .collect()
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}
