use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
}

/// Contact and shipping details copied onto an order when it is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Customer {
    /// Trims the free-text fields and checks name and email.
    pub fn normalized(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        self.email = normalize_email(&self.email)?;
        if self.name.chars().count() < 2 {
            return Err(StoreError::validation(
                "Customer name must be at least 2 characters",
            ));
        }
        self.phone = self
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());
        Ok(self)
    }
}

/// Lower-cases and trims an email address, rejecting anything without a plausible
/// `local@domain.tld` shape.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(StoreError::validation(format!("Invalid email: {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ana@Example.COM ").unwrap(),
            "ana@example.com"
        );
        assert!(normalize_email("ana.example.com").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ana@example").is_err());
        assert!(normalize_email("ana@exa mple.com").is_err());
        assert!(normalize_email("ana@@example.com").is_err());
        assert!(normalize_email("ana@example.").is_err());
    }

    #[test]
    fn test_customer_normalized() {
        let customer = Customer {
            name: "  Lu ".to_string(),
            email: "LU@mail.com".to_string(),
            phone: Some("  ".to_string()),
            address: None,
        }
        .normalized()
        .unwrap();

        assert_eq!(customer.name, "Lu");
        assert_eq!(customer.email, "lu@mail.com");
        assert_eq!(customer.phone, None);
    }

    #[test]
    fn test_customer_name_too_short() {
        let result = Customer {
            name: " L ".to_string(),
            email: "l@mail.com".to_string(),
            phone: None,
            address: None,
        }
        .normalized();
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }
}
