use std::fmt;
use std::str::FromStr;

use super::EmailError;

/// An address split once, on its first `@`.
///
/// Everything after the first `@` is kept as the domain, even if it holds
/// further `@` characters: the split is positional, validation is the job
/// of [`validate_email`](super::validate_email).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    local_part: String,
    domain: String,
}

impl EmailAddress {
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let trimmed = input.trim();
        let (local, domain) = trimmed
            .split_once('@')
            .ok_or_else(|| EmailError::MissingAt(trimmed.to_string()))?;
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }
        Ok(Self {
            local_part: local.to_string(),
            domain: domain.to_string(),
        })
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl FromStr for EmailAddress {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_on_first_at() {
        let addr = EmailAddress::parse("\"a@b\"@example.com").unwrap();
        assert_eq!(addr.local_part(), "\"a");
        assert_eq!(addr.domain(), "b\"@example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let addr: EmailAddress = "  alice@example.com \n".parse().unwrap();
        assert_eq!(addr.to_string(), "alice@example.com");
    }

    #[test]
    fn rejects_missing_parts() {
        assert!(matches!(
            EmailAddress::parse("alice"),
            Err(EmailError::MissingAt(_))
        ));
        assert_eq!(
            EmailAddress::parse("@example.com"),
            Err(EmailError::EmptyLocalPart)
        );
        assert_eq!(EmailAddress::parse("alice@"), Err(EmailError::EmptyDomain));
    }

    proptest! {
        #[test]
        fn first_at_is_the_split_point(
            local in "[a-z0-9.+_-]{1,20}",
            domain in "[a-z0-9.@-]{1,30}",
        ) {
            let addr = EmailAddress::parse(&format!("{local}@{domain}")).unwrap();
            prop_assert_eq!(addr.local_part(), local.as_str());
            prop_assert_eq!(addr.domain(), domain.as_str());
        }
    }
}
