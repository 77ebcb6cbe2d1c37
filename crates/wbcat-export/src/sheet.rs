//! Sheet layout
//!
//! A sheet starts at every top-level record and runs until the next one.
//! Rows hold `level`, `id` and `name`, shifted right by
//! [`INDENT_WIDTH`] cells per level when indenting. Sheet names follow the
//! xlsx rules: at most [`MAX_SHEET_NAME`] characters, no `[]:*?/\`, no
//! leading or trailing apostrophe, unique ignoring case.

use wbcat_model::FlatRecord;

/// Empty cells per level in indented rows
pub const INDENT_WIDTH: usize = 3;

/// Sheet for rows that precede the first top-level record
pub const FALLBACK_SHEET: &str = "catalogue";

/// Longest sheet name kept
pub const MAX_SHEET_NAME: usize = 31;

const ILLEGAL: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '[', ']'];

/// Name Excel keeps for itself
const RESERVED: &str = "History";

/// Contiguous run of records sharing one top-level branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet<'a> {
    /// Branch name, not yet sanitised
    pub name: &'a str,
    /// Rows of the sheet, starting with the top-level record
    pub records: &'a [FlatRecord],
}

/// Split records into sheets
#[must_use]
pub fn split_sheets(records: &[FlatRecord]) -> Vec<Sheet<'_>> {
    let mut starts: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_top_level())
        .map(|(idx, _)| idx)
        .collect();
    if starts.first() != Some(&0) && !records.is_empty() {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(records.len());
            let first = &records[start];
            let name = if first.is_top_level() {
                first.name.as_str()
            } else {
                FALLBACK_SHEET
            };
            Sheet {
                name,
                records: &records[start..end],
            }
        })
        .collect()
}

/// Replace characters unusable in sheet names and cap the length
#[must_use]
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .trim_matches('\'')
        .chars()
        .map(|c| if ILLEGAL.contains(&c) || c.is_control() { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_end_matches('\'');
    if cleaned.is_empty() {
        FALLBACK_SHEET.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Sanitised names for `sheets`, made unique by a ` (n)` suffix
#[must_use]
pub fn unique_sheet_names(sheets: &[Sheet<'_>]) -> Vec<String> {
    let mut taken: Vec<String> = vec![RESERVED.to_lowercase()];
    sheets
        .iter()
        .map(|sheet| {
            let base = sanitize_sheet_name(sheet.name);
            let mut name = base.clone();
            let mut n = 2;
            while taken.contains(&name.to_lowercase()) {
                let suffix = format!(" ({n})");
                let keep = MAX_SHEET_NAME - suffix.chars().count();
                name = base.chars().take(keep).collect::<String>() + &suffix;
                n += 1;
            }
            taken.push(name.to_lowercase());
            name
        })
        .collect()
}

/// Column of a row's `level` cell
#[inline]
#[must_use]
pub fn first_column(record: &FlatRecord, indent: bool) -> usize {
    if indent {
        INDENT_WIDTH * record.level as usize
    } else {
        0
    }
}
