//! Workbook sheet naming.

/// Spreadsheet sheet names are limited to 31 characters.
pub const MAX_SHEET_NAME: usize = 31;

/// Marker inserted where a sheet name was cut.
pub const TRUNCATION_MARKER: &str = "...";

const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Builds a sheet name of the form `"{context} {suffix}"`.
///
/// Characters spreadsheets reject are replaced with `-`. When the name is
/// too long, the context is shortened and marked with `...` so the suffix
/// survives; if even the suffix does not fit, the whole name is cut.
///
/// ```
/// use tableview_lib::export::sheet_name;
///
/// assert_eq!(sheet_name("Spring Launch", "Results"), "Spring Launch Results");
/// assert_eq!(
///     sheet_name("Summer Collection Influencer Outreach 2024", "Results"),
///     "Summer Collection In... Results"
/// );
/// ```
pub fn sheet_name(context: &str, suffix: &str) -> String {
    let context = match sanitize(context) {
        c if c.is_empty() => "Sheet".to_string(),
        c => c,
    };
    let suffix = sanitize(suffix);

    let full = if suffix.is_empty() {
        context.clone()
    } else {
        format!("{} {}", context, suffix)
    };
    if full.chars().count() <= MAX_SHEET_NAME {
        return full;
    }

    let tail = if suffix.is_empty() {
        TRUNCATION_MARKER.to_string()
    } else {
        format!("{} {}", TRUNCATION_MARKER, suffix)
    };
    let tail_len = tail.chars().count();
    if tail_len >= MAX_SHEET_NAME {
        return cut(&full, MAX_SHEET_NAME - TRUNCATION_MARKER.len()) + TRUNCATION_MARKER;
    }

    format!("{}{}", cut(&context, MAX_SHEET_NAME - tail_len), tail)
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '-' } else { c })
        .collect::<String>()
        .trim()
        .trim_matches('\'')
        .trim()
        .to_string()
}

fn cut(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_unchanged() {
        assert_eq!(sheet_name("Q3", "Results"), "Q3 Results");
        assert_eq!(sheet_name("Q3", ""), "Q3");
    }

    #[test]
    fn test_long_context_keeps_suffix() {
        let name = sheet_name("Summer Collection Influencer Outreach 2024", "Results");
        assert!(name.chars().count() <= MAX_SHEET_NAME);
        assert!(name.ends_with("... Results"));
    }

    #[test]
    fn test_long_suffix_cuts_everything() {
        let name = sheet_name("Campaign", "Shortlisted And Onboarded Influencers");
        assert_eq!(name.chars().count(), MAX_SHEET_NAME);
        assert!(name.starts_with("Campaign Shortlisted"));
        assert!(name.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_forbidden_characters_and_blank_context() {
        assert_eq!(sheet_name("Q3/Q4: [EU]", "Results"), "Q3-Q4- -EU- Results");
        assert_eq!(sheet_name("  ", "Results"), "Sheet Results");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let name = sheet_name("Été été été été été été été été", "Results");
        assert!(name.chars().count() <= MAX_SHEET_NAME);
        assert!(name.ends_with("... Results"));
    }
}
