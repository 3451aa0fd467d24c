//! Canonical derivations over the auth state.
//!
//! Every consumer (the facade, the route guards, the orchestrator) calls
//! into this module rather than re-deriving stage or identity helpers
//! locally, so there is exactly one definition of "verified", "onboarded",
//! and "ready" in the codebase.

use crate::state::AuthUser;

/// Shown when an identity has neither a name nor an email to display.
pub const DISPLAY_NAME_FALLBACK: &str = "Usuario";

/// Metadata key flipped by the onboarding flow once the profile step is
/// done.
pub const ONBOARDING_COMPLETED_KEY: &str = "onboarding_completed";

// ─── Stages ─────────────────────────────────────────────────────────

/// The ordered states an identity progresses through. Derived on demand,
/// never stored: verification strictly precedes onboarding, and both
/// precede `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthStage {
    Unauthenticated,
    EmailUnverified,
    OnboardingIncomplete,
    Ready,
}

/// Routing-facing label for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    SignIn,
    VerifyEmail,
    Welcome,
    Complete,
}

impl AuthStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "signin",
            Self::VerifyEmail => "verify-email",
            Self::Welcome => "welcome",
            Self::Complete => "complete",
        }
    }
}

pub fn is_email_verified(user: Option<&AuthUser>) -> bool {
    user.map(|u| u.email_confirmed_at.is_some()).unwrap_or(false)
}

pub fn is_onboarding_complete(user: Option<&AuthUser>) -> bool {
    user.map(|u| u.meta_flag(ONBOARDING_COMPLETED_KEY))
        .unwrap_or(false)
}

/// Fully authenticated, verified, and onboarded.
pub fn is_ready(user: Option<&AuthUser>) -> bool {
    user.is_some() && is_email_verified(user) && is_onboarding_complete(user)
}

pub fn stage(user: Option<&AuthUser>) -> AuthStage {
    if user.is_none() {
        AuthStage::Unauthenticated
    } else if !is_email_verified(user) {
        AuthStage::EmailUnverified
    } else if !is_onboarding_complete(user) {
        AuthStage::OnboardingIncomplete
    } else {
        AuthStage::Ready
    }
}

pub fn step(user: Option<&AuthUser>) -> AuthStep {
    match stage(user) {
        AuthStage::Unauthenticated => AuthStep::SignIn,
        AuthStage::EmailUnverified => AuthStep::VerifyEmail,
        AuthStage::OnboardingIncomplete => AuthStep::Welcome,
        AuthStage::Ready => AuthStep::Complete,
    }
}

// ─── Identity helpers ───────────────────────────────────────────────

/// Name assembled from metadata: `full_name`, else first + last, else
/// first alone. `None` when the profile carries no name at all.
pub fn full_name(user: &AuthUser) -> Option<String> {
    if let Some(full) = user.meta_str("full_name") {
        return Some(full.to_string());
    }
    match (user.meta_str("first_name"), user.meta_str("last_name")) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(first), None) => Some(first.to_string()),
        _ => None,
    }
}

/// Display name: metadata name, else the email's local part, else the
/// fixed fallback.
pub fn display_name(user: Option<&AuthUser>) -> String {
    let Some(user) = user else {
        return DISPLAY_NAME_FALLBACK.to_string();
    };
    if let Some(name) = full_name(user) {
        return name;
    }
    user.email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map(|local| local.to_string())
        .unwrap_or_else(|| DISPLAY_NAME_FALLBACK.to_string())
}

/// Avatar initials: one name token gives one letter, several give
/// first + last initials; with no name the email's first letter is used,
/// and `?` when there is nothing at all.
pub fn initials(user: Option<&AuthUser>) -> String {
    let Some(user) = user else {
        return "?".to_string();
    };

    if let Some(name) = full_name(user) {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let letters: String = match tokens.as_slice() {
            [] => String::new(),
            [only] => only.chars().take(1).collect(),
            [first, .., last] => first
                .chars()
                .take(1)
                .chain(last.chars().take(1))
                .collect(),
        };
        if !letters.is_empty() {
            return letters.to_uppercase();
        }
    }

    user.email
        .as_deref()
        .and_then(|email| email.chars().next())
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

// ─── Roles & permissions ────────────────────────────────────────────

/// Product role from metadata; unset identities are plain users.
pub fn role(user: &AuthUser) -> &str {
    user.meta_str("role").unwrap_or("user")
}

/// Static permission sets per role. `*` grants everything.
fn role_permissions(role: &str) -> &'static [&'static str] {
    match role {
        "admin" => &["*"],
        "manager" => &["view_analytics", "manage_fleet", "manage_routes"],
        "user" => &["view_dashboard", "create_shipments"],
        _ => &[],
    }
}

pub fn has_permission(user: Option<&AuthUser>, permission: &str) -> bool {
    let Some(user) = user else {
        return false;
    };
    let granted = role_permissions(role(user));
    granted.contains(&permission) || granted.contains(&"*")
}

// ─── Company linkage ────────────────────────────────────────────────

/// The company an identity is linked to, from metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Company {
    pub id: Option<String>,
    pub name: Option<String>,
}

pub fn company(user: &AuthUser) -> Company {
    Company {
        id: user.meta_str("company_id").map(|s| s.to_string()),
        name: user.meta_str("company_name").map(|s| s.to_string()),
    }
}

pub fn has_company(user: Option<&AuthUser>) -> bool {
    user.map(|u| u.meta_str("company_id").is_some())
        .unwrap_or(false)
}
