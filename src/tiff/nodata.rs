//! GDAL no-data tag handling
//!
//! GDAL stores a band's no-data sentinel as ASCII text in tag 42113, e.g.
//! `"-9999"`, `"0"` or `"nan"`.

/// Parses the text of a GDAL_NODATA tag
pub fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }

    trimmed.parse::<f64>().ok()
}

/// Formats a sentinel the way GDAL writes it
pub fn format_nodata(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_gdal_forms() {
        assert_eq!(parse_nodata("-9999"), Some(-9999.0));
        assert_eq!(parse_nodata(" 0 "), Some(0.0));
        assert_eq!(parse_nodata("-3.4028234663852886e+38"), Some(f32::MIN as f64));
        assert!(parse_nodata("nan").map(f64::is_nan).unwrap_or(false));
        assert!(parse_nodata("NaN\0").map(f64::is_nan).unwrap_or(false));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_nodata(""), None);
        assert_eq!(parse_nodata("none"), None);
    }

    #[test]
    fn test_format_parses_back() {
        assert_eq!(format_nodata(-9999.0), "-9999");
        assert_eq!(parse_nodata(&format_nodata(-0.5)), Some(-0.5));
        assert_eq!(format_nodata(f64::NAN), "nan");
    }
}
