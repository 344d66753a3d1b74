//! Field validators run before any gateway call
//!
//! Each validator returns the normalized value on success and a
//! [`ShellError`] validation variant on failure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::actions::{FileUpload, FormData};
use crate::error::{Result, ShellError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid phone regex"));
static PINCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("valid pincode regex"));

/// Exclusive upper bound for a listing price
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Upload size cap
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Accepted image content types
pub const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Required, trimmed, non-empty text field
pub fn require<'a>(form: &'a FormData, field: &str) -> Result<&'a str> {
    form.get(field).ok_or_else(|| ShellError::MissingField {
        field: field.to_string(),
    })
}

pub fn price(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ShellError::invalid("price", "must be a number"))?;
    if !value.is_finite() || value <= 0.0 || value >= MAX_PRICE {
        return Err(ShellError::invalid(
            "price",
            "must be greater than 0 and below 10,00,000",
        ));
    }
    Ok(value)
}

/// Positive amount without the listing cap (ledger)
pub fn amount(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ShellError::invalid("amount", "must be a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ShellError::invalid("amount", "must be greater than 0"));
    }
    Ok(value)
}

pub fn pincode(raw: &str) -> Result<&str> {
    let raw = raw.trim();
    if PINCODE_RE.is_match(raw) {
        Ok(raw)
    } else {
        Err(ShellError::invalid("pincode", "must be a 6-digit Indian pincode"))
    }
}

pub fn email(raw: &str) -> Result<&str> {
    let raw = raw.trim();
    if EMAIL_RE.is_match(raw) {
        Ok(raw)
    } else {
        Err(ShellError::invalid("email", "is not a valid email address"))
    }
}

/// 10-digit Indian mobile number; whitespace is ignored
pub fn phone(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if PHONE_RE.is_match(&digits) {
        Ok(digits)
    } else {
        Err(ShellError::invalid(
            "phone",
            "must be a 10-digit mobile number starting with 6-9",
        ))
    }
}

pub fn quantity(raw: &str) -> Result<&str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ShellError::MissingField {
            field: "quantity".to_string(),
        });
    }
    if raw.chars().count() >= 100 {
        return Err(ShellError::invalid("quantity", "must be under 100 characters"));
    }
    Ok(raw)
}

pub fn image(file: &FileUpload) -> Result<()> {
    let content_type = file.content_type.to_lowercase();
    if !IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(ShellError::InvalidFile {
            reason: "Only JPEG, PNG and WebP images are allowed".to_string(),
        });
    }
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ShellError::InvalidFile {
            reason: "Image must be smaller than 5MB".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> FileUpload {
        FileUpload {
            name: "crop.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(price("40").unwrap(), 40.0);
        assert!(price("-5").unwrap_err().is_validation());
        assert!(price("0").is_err());
        assert!(price("1000000").is_err());
        assert!(price("abc").is_err());
    }

    #[test]
    fn test_pincode() {
        assert!(pincode("440001").is_ok());
        assert!(pincode("040001").is_err());
        assert!(pincode("44001").is_err());
    }

    #[test]
    fn test_phone_strips_whitespace() {
        assert_eq!(phone("98765 43210").unwrap(), "9876543210");
        assert!(phone("1234567890").is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("ram@khetgo.in").is_ok());
        assert!(email("ram@khetgo").is_err());
        assert!(email("ram khetgo.in").is_err());
    }

    #[test]
    fn test_quantity_length() {
        assert_eq!(quantity(" 500 kg ").unwrap(), "500 kg");
        assert!(quantity("   ").is_err());
        assert!(quantity(&"x".repeat(100)).is_err());
    }

    #[test]
    fn test_image_type_and_size() {
        assert!(image(&upload("image/png", 1024)).is_ok());
        assert!(image(&upload("image/gif", 1024)).is_err());
        assert!(image(&upload("image/jpeg", MAX_IMAGE_BYTES + 1)).is_err());
    }

    #[test]
    fn test_require_reports_field() {
        let form = FormData::new().text("name", "  ");
        let err = require(&form, "name").unwrap_err();
        assert!(matches!(err, ShellError::MissingField { field } if field == "name"));
    }
}
