//! Contact payload validation.
//!
//! Field rules, enforced here and nowhere else (the store trusts its caller):
//! - `name`: required, 2 to 80 characters
//! - `phone`: optional, at most 20 characters
//! - `email`, `address`: optional, no format validation
//!
//! Lengths count characters, not bytes. Absent optional fields are stored as
//! empty strings, matching what the table holds for contacts created without
//! them.

use super::ValidationError;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 80;
pub const PHONE_MAX: usize = 20;

/// Validated contact fields for create and update.
///
/// Update semantics are wholesale: all four fields replace whatever the row
/// held before, so a valid `ContactInput` is the complete mutable state of a
/// contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactInput {
    name: String,
    phone: String,
    email: String,
    address: String,
}

impl ContactInput {
    pub fn new(
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.ok_or(ValidationError::Missing { field: "name" })?;
        let name_len = name.chars().count();
        if name_len < NAME_MIN || name_len > NAME_MAX {
            return Err(ValidationError::OutOfRange {
                field: "name",
                min: NAME_MIN,
                max: NAME_MAX,
            });
        }

        let phone = phone.unwrap_or_default();
        if phone.chars().count() > PHONE_MAX {
            return Err(ValidationError::TooLong {
                field: "phone",
                max: PHONE_MAX,
            });
        }

        Ok(Self {
            name,
            phone,
            email: email.unwrap_or_default(),
            address: address.unwrap_or_default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}
