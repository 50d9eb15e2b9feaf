/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a raw CSV header line into cleaned column names.
pub fn parse_header_line(line: &str) -> Vec<String> {
    line.trim_start_matches('\u{feff}')
        .trim_end()
        .split(',')
        .map(clean_str)
        .collect()
}
