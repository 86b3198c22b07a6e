/// Credential shape and strength validation
///
/// Pure functions with no I/O. These are the exact business rules enforced at
/// registration and login; they deliberately stop short of anything requiring
/// a network round-trip (no DNS or mailbox verification).
///
/// # Example
///
/// ```
/// use studydeck_shared::auth::validation::{validate_email, validate_password};
///
/// assert!(validate_email("user@example.com"));
/// assert!(!validate_email("not-an-email"));
///
/// assert!(validate_password("abc1!x"));
/// assert!(!validate_password("short"));
/// ```

/// Characters counted as "special" for password strength.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Checks that a string has `local@domain.tld` shape.
///
/// Rules:
/// - exactly one `@` separating a non-empty local part and domain
/// - the domain contains a literal dot with non-empty text on both sides
/// - no whitespace anywhere
///
/// Anything else is rejected. There is no verification that the domain
/// exists or the mailbox is deliverable.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }

    // Dot in the domain with something on both sides.
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Checks password strength.
///
/// A password is accepted when it:
/// - is at least 6 characters long
/// - contains at least one alphabetic character
/// - contains at least one digit
/// - contains at least one character from `!@#$%^&*(),.?":{}|<>`
pub fn validate_password(password: &str) -> bool {
    if password.chars().count() < 6 {
        return false;
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    has_letter && has_digit && has_special
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_plain_addresses() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("a@b.c"));
        assert!(validate_email("first.last@sub.example.co.uk"));
        assert!(validate_email("user+tag@example.com"));
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert!(!validate_email(""));
        assert!(!validate_email("plainaddress"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("user@example."));
        assert!(!validate_email("user@@example.com"));
    }

    #[test]
    fn test_validate_email_rejects_whitespace() {
        assert!(!validate_email("user name@example.com"));
        assert!(!validate_email("user@exa mple.com"));
        assert!(!validate_email(" user@example.com"));
        assert!(!validate_email("user@example.com "));
        assert!(!validate_email("user@example.co\tm"));
    }

    #[test]
    fn test_validate_password_boundary_lengths() {
        // Exactly 6 characters with all classes present
        assert!(validate_password("abc1!x"));
        // 5 characters, all classes present but too short
        assert!(!validate_password("ab1!x"));
    }

    #[test]
    fn test_validate_password_missing_classes() {
        // 6 characters but no digit
        assert!(!validate_password("abcd!e"));
        // No letter
        assert!(!validate_password("12345!"));
        // No special character
        assert!(!validate_password("abc123"));
        // Letters only
        assert!(!validate_password("abcdef"));
    }

    #[test]
    fn test_validate_password_special_set() {
        for special in "!@#$%^&*(),.?\":{}|<>".chars() {
            let candidate = format!("abc12{}", special);
            assert!(
                validate_password(&candidate),
                "'{}' should count as special",
                special
            );
        }
        // Characters outside the fixed set do not count
        assert!(!validate_password("abc12-"));
        assert!(!validate_password("abc12_"));
        assert!(!validate_password("abc12 "));
    }
}
