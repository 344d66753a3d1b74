//! Form parsing: validated records ready for the gateway
//!
//! Nothing here performs I/O. A failure is always a validation error, so a
//! rejected form never reaches the gateway.

use chrono::Utc;
use serde_json::Value;

use super::intent::{FileUpload, FormData};
use crate::error::{Result, ShellError};
use crate::gateway::SignUp;
use crate::record::Record;
use crate::state::Role;
use crate::validation;

const MIN_PASSWORD: usize = 6;

/// A listing ready to insert, plus its optional photo
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub record: Record,
    pub image: Option<FileUpload>,
}

fn optional(form: &FormData, field: &str) -> Value {
    form.get(field).map(Value::from).unwrap_or(Value::Null)
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

pub fn listing(form: &FormData) -> Result<ListingDraft> {
    let name = validation::require(form, "name")?;
    let price = validation::price(validation::require(form, "price")?)?;
    let quantity = validation::quantity(form.get("quantity").unwrap_or_default())?;
    let location = validation::require(form, "location")?;
    let pincode = validation::pincode(validation::require(form, "pincode")?)?;

    let image = form.get_file("image").filter(|f| !f.bytes.is_empty()).cloned();
    if let Some(file) = &image {
        validation::image(file)?;
    }

    let record = Record::new()
        .with("name", name)
        .with("price", price)
        .with("unit", form.get("unit").unwrap_or("kg"))
        .with("quantity", quantity)
        .with("location", location)
        .with("pincode", pincode)
        .with("category", optional(form, "category"))
        .with("description", optional(form, "description"));

    Ok(ListingDraft { record, image })
}

pub fn ledger_entry(form: &FormData) -> Result<Record> {
    let entry_type = match form.get("entry_type") {
        Some(t @ ("income" | "expense")) => t,
        Some(_) => return Err(ShellError::invalid("entry_type", "must be income or expense")),
        None => {
            return Err(ShellError::MissingField {
                field: "entry_type".to_string(),
            })
        }
    };
    let description = validation::require(form, "description")?;
    let amount = validation::amount(validation::require(form, "amount")?)?;

    Ok(Record::new()
        .with("entry_type", entry_type)
        .with("description", description)
        .with("amount", amount)
        .with("category", form.get("category").unwrap_or("General"))
        .with(
            "entry_date",
            form.get("entry_date").map(str::to_string).unwrap_or_else(today),
        ))
}

pub fn forum_post(form: &FormData) -> Result<Record> {
    let title = validation::require(form, "title")?;
    let content = validation::require(form, "content")?;
    Ok(Record::new().with("title", title).with("content", content))
}

/// (email, password) for sign-in
pub fn credentials(form: &FormData) -> Result<(String, String)> {
    let email = validation::email(validation::require(form, "email")?)?;
    let password = validation::require(form, "password")?;
    Ok((email.to_string(), password.to_string()))
}

pub fn signup(form: &FormData) -> Result<SignUp> {
    let full_name = validation::require(form, "full_name")?;
    let (email, password) = credentials(form)?;
    if password.chars().count() < MIN_PASSWORD {
        return Err(ShellError::invalid(
            "password",
            "must be at least 6 characters",
        ));
    }
    let phone = validation::phone(validation::require(form, "phone")?)?;
    let role = match form.get("role") {
        None => Role::Farmer,
        // Admins are promoted by the backend, never self-selected
        Some(r) => match r.parse::<Role>() {
            Ok(Role::Admin) | Err(_) => {
                return Err(ShellError::invalid("role", "must be farmer or buyer"))
            }
            Ok(role) => role,
        },
    };

    Ok(SignUp {
        email,
        password,
        full_name: full_name.to_string(),
        phone,
        role,
        district: form.get("district").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_form() -> FormData {
        FormData::new()
            .text("name", "Tomato")
            .text("price", "40")
            .text("quantity", "500 kg")
            .text("location", "Nagpur")
            .text("pincode", "440001")
    }

    #[test]
    fn test_listing_builds_record() {
        let draft = listing(&listing_form()).unwrap();
        assert_eq!(draft.record.number("price"), Some(40.0));
        assert_eq!(draft.record.text("unit").as_deref(), Some("kg"));
        assert!(draft.image.is_none());
    }

    #[test]
    fn test_listing_rejects_negative_price() {
        let err = listing(&listing_form().text("price", "-5")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_listing_rejects_bad_image() {
        let form = listing_form().file(
            "image",
            FileUpload {
                name: "crop.gif".into(),
                content_type: "image/gif".into(),
                bytes: vec![1, 2, 3],
            },
        );
        assert!(matches!(listing(&form), Err(ShellError::InvalidFile { .. })));
    }

    #[test]
    fn test_ledger_entry_defaults_date() {
        let form = FormData::new()
            .text("entry_type", "expense")
            .text("description", "Urea")
            .text("amount", "650");
        let record = ledger_entry(&form).unwrap();
        assert_eq!(record.text("category").as_deref(), Some("General"));
        assert!(record.text("entry_date").is_some());
    }

    #[test]
    fn test_signup_rejects_admin_role() {
        let form = FormData::new()
            .text("full_name", "Ram")
            .text("email", "ram@khetgo.in")
            .text("password", "secret1")
            .text("phone", "9876543210")
            .text("role", "admin");
        assert!(signup(&form).unwrap_err().is_validation());
    }

    #[test]
    fn test_signup_defaults_to_farmer() {
        let form = FormData::new()
            .text("full_name", "Ram")
            .text("email", "ram@khetgo.in")
            .text("password", "secret1")
            .text("phone", "98765 43210");
        let request = signup(&form).unwrap();
        assert_eq!(request.role, Role::Farmer);
        assert_eq!(request.phone, "9876543210");
    }
}
