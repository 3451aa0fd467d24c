//! User-facing message catalogs.
//!
//! The product ships in Spanish with an English fallback; the locale is
//! fixed per store instance. Raw provider messages never reach the user;
//! they stay in logs as diagnostic detail.

use serde::{Deserialize, Serialize};

use crate::error::AuthErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Parse a locale tag, falling back to the product default.
    pub fn parse(tag: &str) -> Self {
        match tag.split('-').next().unwrap_or("") {
            "en" => Self::En,
            _ => Self::Es,
        }
    }
}

/// The message shown for a normalized error kind.
pub fn error_message(locale: Locale, kind: AuthErrorKind) -> &'static str {
    use AuthErrorKind::*;
    match locale {
        Locale::Es => match kind {
            InvalidCredentials => {
                "Email o contraseña incorrectos. Por favor, verifica tus datos."
            }
            EmailNotVerified => "Tu email no ha sido verificado. Revisa tu bandeja de entrada.",
            UserNotFound => "No encontramos una cuenta con ese email. ¿Quieres crear una cuenta?",
            EmailAlreadyExists => "Ya existe una cuenta con este email. ¿Quieres iniciar sesión?",
            WeakPassword => {
                "La contraseña debe tener al menos 12 caracteres, una minúscula y un número."
            }
            NetworkError => "Error de conexión. Verifica tu internet e intenta de nuevo.",
            NotAuthenticated => "Usuario no autenticado.",
            Unknown => "Ocurrió un error inesperado. Por favor, intenta de nuevo.",
        },
        Locale::En => match kind {
            InvalidCredentials => "Incorrect email or password. Please check your details.",
            EmailNotVerified => "Your email has not been verified. Check your inbox.",
            UserNotFound => "We couldn't find an account with that email. Want to create one?",
            EmailAlreadyExists => "An account with this email already exists. Want to sign in?",
            WeakPassword => {
                "The password needs at least 12 characters, a lowercase letter and a number."
            }
            NetworkError => "Connection error. Check your internet and try again.",
            NotAuthenticated => "You are not signed in.",
            Unknown => "Something unexpected went wrong. Please try again.",
        },
    }
}

/// Shown on the login screen after a reset-password request.
pub fn reset_link_sent(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "Se ha enviado un enlace de recuperación a tu email.",
        Locale::En => "A recovery link has been sent to your email.",
    }
}

/// Local failure when resending verification without a known address.
pub fn missing_email(locale: Locale) -> &'static str {
    match locale {
        Locale::Es => "No se encontró el email del usuario.",
        Locale::En => "No email address found for the current user.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locale_is_spanish() {
        assert_eq!(Locale::default(), Locale::Es);
        assert_eq!(Locale::parse("es-CO"), Locale::Es);
        assert_eq!(Locale::parse("en-US"), Locale::En);
        assert_eq!(Locale::parse("fr"), Locale::Es);
    }

    #[test]
    fn every_kind_has_a_message_in_both_locales() {
        use AuthErrorKind::*;
        for kind in [
            InvalidCredentials,
            EmailNotVerified,
            UserNotFound,
            EmailAlreadyExists,
            WeakPassword,
            NetworkError,
            NotAuthenticated,
            Unknown,
        ] {
            assert!(!error_message(Locale::Es, kind).is_empty());
            assert!(!error_message(Locale::En, kind).is_empty());
        }
    }
}
