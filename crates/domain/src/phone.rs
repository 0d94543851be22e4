// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Phone number normalization for the outbound SMS transport.
//!
//! Givers type numbers in local form; the transport wants E.164. Numbers
//! are normalized at send time so the stored gift keeps what the giver
//! actually entered.

use crate::error::DomainError;

/// Country calling code applied to local-form numbers.
const COUNTRY_CODE: &str = "358";

/// Normalizes a phone number to `+358…` form.
///
/// Accepted inputs, after stripping spaces, dashes and parentheses:
///
/// - `+358401234567`: already international, kept as-is
/// - `00358401234567`: international with `00` prefix
/// - `358401234567`: bare country code
/// - `0401234567`: local form, leading zero replaced
///
/// # Errors
///
/// Returns `DomainError::InvalidPhoneNumber` if the input is empty after
/// stripping, contains non-digit characters, or matches none of the forms
/// above.
pub fn normalize_phone_number(raw: &str) -> Result<String, DomainError> {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if stripped.is_empty() {
        return Err(DomainError::InvalidPhoneNumber {
            value: raw.to_owned(),
            reason: "number is empty",
        });
    }

    let plus = stripped.starts_with('+');
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidPhoneNumber {
            value: raw.to_owned(),
            reason: "number contains non-digit characters",
        });
    }

    if plus {
        return Ok(format!("+{digits}"));
    }

    if let Some(rest) = digits.strip_prefix("00") {
        return Ok(format!("+{rest}"));
    }

    if digits.starts_with(COUNTRY_CODE) {
        return Ok(format!("+{digits}"));
    }

    if let Some(rest) = digits.strip_prefix('0') {
        return Ok(format!("+{COUNTRY_CODE}{rest}"));
    }

    Err(DomainError::InvalidPhoneNumber {
        value: raw.to_owned(),
        reason: "number is neither international nor local form",
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_form_gets_country_code() {
        assert_eq!(
            normalize_phone_number("0401234567").unwrap(),
            "+358401234567"
        );
    }

    #[test]
    fn test_bare_country_code_gains_plus() {
        assert_eq!(
            normalize_phone_number("358401234567").unwrap(),
            "+358401234567"
        );
    }

    #[test]
    fn test_international_forms_kept() {
        assert_eq!(
            normalize_phone_number("+358401234567").unwrap(),
            "+358401234567"
        );
        assert_eq!(
            normalize_phone_number("00358401234567").unwrap(),
            "+358401234567"
        );
        // Foreign numbers pass through untouched.
        assert_eq!(normalize_phone_number("+4512345678").unwrap(), "+4512345678");
    }

    #[test]
    fn test_formatting_characters_are_stripped() {
        assert_eq!(
            normalize_phone_number("040 123-4567").unwrap(),
            "+358401234567"
        );
        assert_eq!(
            normalize_phone_number("(040) 1234567").unwrap(),
            "+358401234567"
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(normalize_phone_number("").is_err());
        assert!(normalize_phone_number("   ").is_err());
        assert!(normalize_phone_number("040abc").is_err());
        assert!(normalize_phone_number("12345").is_err());
        assert!(normalize_phone_number("+").is_err());
    }
}
