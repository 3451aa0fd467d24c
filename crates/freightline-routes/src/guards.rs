//! Route access guards.
//!
//! Five pure predicates over the derived auth stage. A guard never mutates
//! anything; it answers render / wait / redirect and the shell acts on it.
//! Stage checks go through the same derivation the facade uses, so the
//! guards cannot drift from `AuthSnapshot::step()`.

use freightline_auth::{AuthSnapshot, AuthStage};

use crate::nav::NavState;
use crate::routes::{paths, GuardKind};

/// What a guard decided for the current navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the route's view.
    Render,
    /// Initial auth state still unknown; show the loading view.
    Loading,
    /// Send the user elsewhere.
    Redirect {
        to: &'static str,
        state: NavState,
    },
}

impl GuardOutcome {
    fn redirect(to: &'static str) -> Self {
        Self::Redirect {
            to,
            state: NavState::default(),
        }
    }
}

/// Evaluate a guard kind against the derived stage.
///
/// `current_path` is only read by the protected guard, which captures it
/// so the login screen can return the user after sign-in.
pub fn evaluate(
    guard: GuardKind,
    snapshot: &AuthSnapshot,
    current_path: &str,
) -> GuardOutcome {
    let stage = snapshot.stage();
    let loading = snapshot.loading();
    match guard {
        GuardKind::Protected => protected(stage, loading, current_path),
        GuardKind::Public => public(stage, loading),
        GuardKind::Auth => auth(stage, loading),
        GuardKind::EmailVerification => email_verification(stage, loading),
        GuardKind::Onboarding => onboarding(stage, loading),
        GuardKind::Open => GuardOutcome::Render,
    }
}

/// Full product surface: every rung of the stage ladder is enforced, and
/// the original destination is captured for the post-login return.
fn protected(stage: AuthStage, loading: bool, current_path: &str) -> GuardOutcome {
    if loading {
        return GuardOutcome::Loading;
    }
    match stage {
        AuthStage::Unauthenticated => GuardOutcome::Redirect {
            to: paths::LOGIN,
            state: NavState::from_path(current_path),
        },
        AuthStage::EmailUnverified => GuardOutcome::redirect(paths::VERIFY_EMAIL),
        AuthStage::OnboardingIncomplete => GuardOutcome::redirect(paths::WELCOME),
        AuthStage::Ready => GuardOutcome::Render,
    }
}

/// Landing pages: anonymous and partially-onboarded users both see them;
/// only fully-ready users skip ahead to the dashboard.
fn public(stage: AuthStage, loading: bool) -> GuardOutcome {
    if loading {
        return GuardOutcome::Loading;
    }
    if stage == AuthStage::Ready {
        return GuardOutcome::redirect(paths::DASHBOARD);
    }
    GuardOutcome::Render
}

/// Sign-up/login screens share the public redirect rule.
fn auth(stage: AuthStage, loading: bool) -> GuardOutcome {
    public(stage, loading)
}

fn email_verification(stage: AuthStage, loading: bool) -> GuardOutcome {
    if loading {
        return GuardOutcome::Loading;
    }
    match stage {
        AuthStage::Unauthenticated => GuardOutcome::redirect(paths::SIGNUP),
        AuthStage::EmailUnverified => GuardOutcome::Render,
        AuthStage::OnboardingIncomplete => GuardOutcome::redirect(paths::WELCOME),
        AuthStage::Ready => GuardOutcome::redirect(paths::DASHBOARD),
    }
}

fn onboarding(stage: AuthStage, loading: bool) -> GuardOutcome {
    if loading {
        return GuardOutcome::Loading;
    }
    match stage {
        AuthStage::Unauthenticated => GuardOutcome::redirect(paths::SIGNUP),
        AuthStage::EmailUnverified => GuardOutcome::redirect(paths::VERIFY_EMAIL),
        AuthStage::OnboardingIncomplete => GuardOutcome::Render,
        AuthStage::Ready => GuardOutcome::redirect(paths::DASHBOARD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use freightline_auth::{AuthSnapshot, AuthState, AuthUser};
    use freightline_provider::MetadataMap;

    fn snapshot_at(stage: AuthStage, loading: bool) -> AuthSnapshot {
        let user = match stage {
            AuthStage::Unauthenticated => None,
            AuthStage::EmailUnverified => Some(user(false, false)),
            AuthStage::OnboardingIncomplete => Some(user(true, false)),
            AuthStage::Ready => Some(user(true, true)),
        };
        let mut state = AuthState::default();
        state.loading = loading;
        state.is_authenticated = user.is_some();
        state.is_email_verified = matches!(
            stage,
            AuthStage::OnboardingIncomplete | AuthStage::Ready
        );
        state.is_onboarding_complete = stage == AuthStage::Ready;
        state.user = user;
        AuthSnapshot::new(state)
    }

    fn user(verified: bool, onboarded: bool) -> AuthUser {
        let mut metadata = MetadataMap::new();
        if onboarded {
            metadata.insert("onboarding_completed".into(), serde_json::json!(true));
        }
        AuthUser {
            id: "u1".into(),
            email: Some("ana@acme.co".into()),
            phone: None,
            email_confirmed_at: verified.then(Utc::now),
            last_sign_in_at: None,
            created_at: None,
            app_metadata: MetadataMap::new(),
            metadata,
        }
    }

    #[test]
    fn protected_redirects_anonymous_to_login_with_origin() {
        let snap = snapshot_at(AuthStage::Unauthenticated, false);
        let outcome = evaluate(GuardKind::Protected, &snap, "/fleet");
        assert_eq!(
            outcome,
            GuardOutcome::Redirect {
                to: paths::LOGIN,
                state: NavState::from_path("/fleet"),
            }
        );
    }

    #[test]
    fn protected_ladder() {
        let snap = snapshot_at(AuthStage::EmailUnverified, false);
        assert_eq!(
            evaluate(GuardKind::Protected, &snap, "/dashboard"),
            GuardOutcome::redirect(paths::VERIFY_EMAIL)
        );

        let snap = snapshot_at(AuthStage::OnboardingIncomplete, false);
        assert_eq!(
            evaluate(GuardKind::Protected, &snap, "/dashboard"),
            GuardOutcome::redirect(paths::WELCOME)
        );

        let snap = snapshot_at(AuthStage::Ready, false);
        assert_eq!(
            evaluate(GuardKind::Protected, &snap, "/dashboard"),
            GuardOutcome::Render
        );
    }

    #[test]
    fn loading_wins_over_everything() {
        for kind in [
            GuardKind::Protected,
            GuardKind::Public,
            GuardKind::Auth,
            GuardKind::EmailVerification,
            GuardKind::Onboarding,
        ] {
            let snap = snapshot_at(AuthStage::Ready, true);
            assert_eq!(
                evaluate(kind, &snap, "/"),
                GuardOutcome::Loading,
                "{kind:?}"
            );
        }
    }

    #[test]
    fn public_renders_for_partially_onboarded() {
        for stage in [
            AuthStage::Unauthenticated,
            AuthStage::EmailUnverified,
            AuthStage::OnboardingIncomplete,
        ] {
            let snap = snapshot_at(stage, false);
            assert_eq!(evaluate(GuardKind::Public, &snap, "/"), GuardOutcome::Render);
        }
        let snap = snapshot_at(AuthStage::Ready, false);
        assert_eq!(
            evaluate(GuardKind::Public, &snap, "/"),
            GuardOutcome::redirect(paths::DASHBOARD)
        );
    }

    #[test]
    fn auth_matches_public_rule() {
        let snap = snapshot_at(AuthStage::Ready, false);
        assert_eq!(
            evaluate(GuardKind::Auth, &snap, paths::LOGIN),
            GuardOutcome::redirect(paths::DASHBOARD)
        );
        let snap = snapshot_at(AuthStage::EmailUnverified, false);
        assert_eq!(
            evaluate(GuardKind::Auth, &snap, paths::LOGIN),
            GuardOutcome::Render
        );
    }

    #[test]
    fn email_verification_forwards_by_onboarding() {
        let snap = snapshot_at(AuthStage::Unauthenticated, false);
        assert_eq!(
            evaluate(GuardKind::EmailVerification, &snap, paths::VERIFY_EMAIL),
            GuardOutcome::redirect(paths::SIGNUP)
        );

        let snap = snapshot_at(AuthStage::EmailUnverified, false);
        assert_eq!(
            evaluate(GuardKind::EmailVerification, &snap, paths::VERIFY_EMAIL),
            GuardOutcome::Render
        );

        let snap = snapshot_at(AuthStage::OnboardingIncomplete, false);
        assert_eq!(
            evaluate(GuardKind::EmailVerification, &snap, paths::VERIFY_EMAIL),
            GuardOutcome::redirect(paths::WELCOME)
        );

        let snap = snapshot_at(AuthStage::Ready, false);
        assert_eq!(
            evaluate(GuardKind::EmailVerification, &snap, paths::VERIFY_EMAIL),
            GuardOutcome::redirect(paths::DASHBOARD)
        );
    }

    #[test]
    fn onboarding_requires_verification_first() {
        // unverified user opening the welcome screen directly is bounced
        // to verify-email, never rendered
        let snap = snapshot_at(AuthStage::EmailUnverified, false);
        assert_eq!(
            evaluate(GuardKind::Onboarding, &snap, paths::WELCOME),
            GuardOutcome::redirect(paths::VERIFY_EMAIL)
        );

        let snap = snapshot_at(AuthStage::OnboardingIncomplete, false);
        assert_eq!(
            evaluate(GuardKind::Onboarding, &snap, paths::WELCOME),
            GuardOutcome::Render
        );

        let snap = snapshot_at(AuthStage::Ready, false);
        assert_eq!(
            evaluate(GuardKind::Onboarding, &snap, paths::WELCOME),
            GuardOutcome::redirect(paths::DASHBOARD)
        );
    }

    #[test]
    fn open_routes_always_render() {
        let snap = snapshot_at(AuthStage::Unauthenticated, true);
        assert_eq!(evaluate(GuardKind::Open, &snap, "/404"), GuardOutcome::Render);
    }
}
