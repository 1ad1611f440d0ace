use crate::utils::error::{DashError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DashError::invalid_value(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DashError::invalid_value(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(DashError::invalid_value(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DashError::invalid_value(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(DashError::invalid_value(
            field_name,
            path,
            "Path contains null bytes",
        ));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(DashError::invalid_value(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DashError::invalid_value(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DashError::invalid_value(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// 信心門檻只能以 5 為單位調整
pub fn validate_step(field_name: &str, value: u8, step: u8) -> Result<()> {
    if step > 0 && value % step != 0 {
        return Err(DashError::invalid_value(
            field_name,
            value,
            format!("Value must be a multiple of {}", step),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("market.quote_base_url", "https://example.com").is_ok());
        assert!(validate_url("market.quote_base_url", "http://127.0.0.1:9000").is_ok());
        assert!(validate_url("market.quote_base_url", "").is_err());
        assert!(validate_url("market.quote_base_url", "invalid-url").is_err());
        assert!(validate_url("market.quote_base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("scan.max_workers", 16, 1).is_ok());
        assert!(validate_positive_number("scan.max_workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("live.refresh_seconds", 60u64, 15, 300).is_ok());
        assert!(validate_range("live.refresh_seconds", 10u64, 15, 300).is_err());
        assert!(validate_range("observer.latitude", -91.0, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_step() {
        assert!(validate_step("filters.min_confidence", 35, 5).is_ok());
        assert!(validate_step("filters.min_confidence", 33, 5).is_err());
    }

    #[test]
    fn test_validate_path_and_strings() {
        assert!(validate_path("export.output_path", "./output").is_ok());
        assert!(validate_path("export.output_path", "").is_err());
        assert!(validate_non_empty_string("server.address", "  ").is_err());
    }
}
