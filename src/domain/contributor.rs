use std::collections::BTreeMap;
use std::fmt;

/// Contributor details collected by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorInfo {
    pub name: String,
    pub email: String,
    pub mobile: String,
    /// Free text, never validated.
    pub address: String,
    /// Withholds identity from the gateway prefill. Fields are still validated.
    pub anonymous: bool,
}

/// Fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Mobile,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level messages. Empty means the contributor may proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_INVALID: &str = "Valid email is required";
pub const MOBILE_INVALID: &str = "Valid 10-digit mobile number is required";

/// Checks the required contributor fields.
///
/// Address and the anonymous flag are never looked at.
pub fn validate(info: &ContributorInfo) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if info.name.trim().is_empty() {
        errors.insert(Field::Name, NAME_REQUIRED);
    }
    if !is_mailbox(&info.email) {
        errors.insert(Field::Email, EMAIL_INVALID);
    }
    if !is_mobile(&info.mobile) {
        errors.insert(Field::Mobile, MOBILE_INVALID);
    }
    errors
}

/// Permissive mailbox shape: `local@domain` with a dot inside the domain.
fn is_mailbox(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn is_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContributorInfo {
        ContributorInfo {
            name: "Asha".to_string(),
            email: "asha@example.org".to_string(),
            mobile: "9876543210".to_string(),
            address: String::new(),
            anonymous: false,
        }
    }

    #[test]
    fn test_valid_contributor_has_no_errors() {
        assert!(validate(&valid()).is_empty());

        let mut anonymous = valid();
        anonymous.anonymous = true;
        anonymous.address = "12 MG Road".to_string();
        assert!(validate(&anonymous).is_empty());
    }

    #[test]
    fn test_missing_name_only() {
        let info = ContributorInfo {
            name: String::new(),
            email: "a@b.com".to_string(),
            mobile: "9876543210".to_string(),
            ..Default::default()
        };
        let errors = validate(&info);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Name), Some(NAME_REQUIRED));
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let mut info = valid();
        info.name = "   ".to_string();
        assert!(validate(&info).contains(Field::Name));
    }

    #[test]
    fn test_email_shapes() {
        for bad in ["", "plain", "a@b", "@b.com", "a@.com", "a@com.", "a b@c.com"] {
            let mut info = valid();
            info.email = bad.to_string();
            assert!(validate(&info).contains(Field::Email), "{bad:?} accepted");
        }
        for good in ["a@b.co", "first.last@sub.example.in", "x+tag@y.z"] {
            let mut info = valid();
            info.email = good.to_string();
            assert!(validate(&info).is_empty(), "{good:?} rejected");
        }
    }

    #[test]
    fn test_mobile_must_be_ten_digits() {
        for bad in ["", "987654321", "98765432100", "98765-4321", "987654321a", "٩٨٧٦٥٤٣٢١٠"] {
            let mut info = valid();
            info.mobile = bad.to_string();
            assert_eq!(
                validate(&info).get(Field::Mobile),
                Some(MOBILE_INVALID),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_all_fields_reported_together() {
        let errors = validate(&ContributorInfo::default());
        let fields: Vec<Field> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Mobile]);
        assert_eq!(
            errors.to_string(),
            "name: Name is required; email: Valid email is required; \
             mobile: Valid 10-digit mobile number is required"
        );
    }
}
