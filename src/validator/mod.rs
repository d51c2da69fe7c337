mod address;
mod domain;
mod local;
mod types;

pub use address::EmailAddress;
pub use types::{EmailError, ValidationMode, ValidationReport};

use domain::check_domain;
use local::{is_local_relaxed, is_local_strict, is_quoted};

/// Syntactic predicate consulted before any network activity.
///
/// Implementations must be pure: no DNS, no sockets.
pub trait SyntaxCheck {
    fn is_valid(&self, email: &str) -> bool;
}

impl SyntaxCheck for ValidationMode {
    fn is_valid(&self, email: &str) -> bool {
        is_valid(email, *self)
    }
}

pub fn is_valid(email: &str, mode: ValidationMode) -> bool {
    validate_email(email, mode).ok
}

pub fn validate_email(email: &str, mode: ValidationMode) -> ValidationReport {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let Some((local, domain)) = split_for_validation(input, mode) else {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport { ok: false, reasons };
    };

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }

    check_domain(domain, &mut reasons);

    let local_ok = match mode {
        ValidationMode::Strict => is_local_strict(local),
        ValidationMode::Relaxed => is_local_relaxed(local),
    };
    if !local_ok {
        reasons.push(match mode {
            ValidationMode::Strict => "invalid local part (strict rules)".into(),
            ValidationMode::Relaxed => "invalid local part (relaxed rules)".into(),
        });
    }

    let ok = reasons.is_empty();
    ValidationReport { ok, reasons }
}

// Relaxed mode lets a quoted local part carry '@', so the domain starts
// after the last one.
fn split_for_validation(input: &str, mode: ValidationMode) -> Option<(&str, &str)> {
    match mode {
        ValidationMode::Strict => {
            let (local, domain) = input.split_once('@')?;
            (!domain.contains('@')).then_some((local, domain))
        }
        ValidationMode::Relaxed => {
            let (local, domain) = input.rsplit_once('@')?;
            (!local.contains('@') || is_quoted(local)).then_some((local, domain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn accepts_basic() {
        let r = validate_email("alice@example.com", ValidationMode::Strict);
        assert!(r.ok, "{:?}", r.reasons);
    }

    #[test]
    fn rejects_double_at() {
        let r = validate_email("a@@b.com", ValidationMode::Strict);
        assert!(!r.ok);
        assert_eq!(r.reasons, vec!["must contain exactly one '@'".to_string()]);
    }

    #[test]
    fn rejects_missing_at() {
        assert!(!is_valid("alice.example.com", ValidationMode::Relaxed));
    }

    #[test]
    fn relaxed_accepts_quoted_local_with_at() {
        assert!(is_valid("\"a@b\"@example.com", ValidationMode::Relaxed));
        assert!(!is_valid("\"a@b\"@example.com", ValidationMode::Strict));
    }

    #[test]
    fn relaxed_rejects_bare_double_at() {
        assert!(!is_valid("a@b@example.com", ValidationMode::Relaxed));
    }

    #[test]
    fn rejects_overlong_local_part() {
        let email = format!("{}@example.com", "a".repeat(65));
        let r = validate_email(&email, ValidationMode::Strict);
        assert!(r.reasons.iter().any(|r| r.contains("local part length 65")));
    }

    #[test]
    fn mode_is_a_syntax_check() {
        let check: &dyn SyntaxCheck = &ValidationMode::Strict;
        assert!(check.is_valid("bob@example.org"));
        assert!(!check.is_valid("bob@"));
    }
}
