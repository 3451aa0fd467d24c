//! Pure form validators.
//!
//! Deterministic functions with no I/O; the auth flows consume their
//! results but they are independent of store state.

use crate::messages::Locale;

/// Minimal email shape check: one `@`, non-empty local part, and a dotted
/// domain. Full validation belongs to the provider; this only catches
/// obvious typos before a round-trip.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.contains(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Why a password fails the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort,
    MissingLowercase,
    MissingDigit,
}

impl PasswordIssue {
    pub fn message(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Es => match self {
                Self::TooShort => "Debe tener al menos 12 caracteres",
                Self::MissingLowercase => "Debe contener al menos una letra minúscula",
                Self::MissingDigit => "Debe contener al menos un número",
            },
            Locale::En => match self {
                Self::TooShort => "Must be at least 12 characters",
                Self::MissingLowercase => "Must contain at least one lowercase letter",
                Self::MissingDigit => "Must contain at least one number",
            },
        }
    }
}

/// Policy check: at least 12 characters, one lowercase letter, one digit.
/// Empty result means the password passes.
pub fn validate_password(password: &str) -> Vec<PasswordIssue> {
    let mut issues = Vec::new();
    if password.chars().count() < 12 {
        issues.push(PasswordIssue::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        issues.push(PasswordIssue::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordIssue::MissingDigit);
    }
    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthBand {
    Weak,
    Medium,
    Strong,
}

/// 0–5 score: length ≥ 12, lowercase, uppercase, digit, symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub score: u8,
    pub band: StrengthBand,
}

/// `None` for an empty password (nothing to grade yet).
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }

    let mut score = 0u8;
    if password.chars().count() >= 12 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let band = if score < 2 {
        StrengthBand::Weak
    } else if score < 4 {
        StrengthBand::Medium
    } else {
        StrengthBand::Strong
    };
    Some(PasswordStrength { score, band })
}

/// Colombian phone format: optional `+57` prefix, then a 10-digit mobile
/// or 7-digit landline, with spaces, dashes, and area parentheses allowed.
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let rest = trimmed.strip_prefix("+57").unwrap_or(trimmed);

    let mut digits = 0usize;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    digits == 7 || digits == 10
}
