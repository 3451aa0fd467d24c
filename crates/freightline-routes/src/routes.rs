//! The product's route table.
//!
//! A static mapping from path to guard kind, view identifier, and page
//! metadata, organized in four groups. Views are identifiers only; what
//! gets rendered for each is the embedding shell's business.

pub mod paths {
    // Public
    pub const HOME: &str = "/";

    // Auth flow
    pub const SIGNUP: &str = "/auth/signup";
    pub const LOGIN: &str = "/auth/login";
    pub const VERIFY_EMAIL: &str = "/auth/verify-email";
    pub const WELCOME: &str = "/auth/welcome";
    pub const COMPANY_SETUP: &str = "/auth/company-setup";
    pub const FORGOT_PASSWORD: &str = "/auth/forgot-password";
    pub const RESET_PASSWORD: &str = "/auth/reset-password";

    // Product
    pub const DASHBOARD: &str = "/dashboard";
    pub const FLEET: &str = "/fleet";
    pub const ROUTES: &str = "/routes";
    pub const SHIPMENTS: &str = "/shipments";
    pub const ANALYTICS: &str = "/analytics";
    pub const SETTINGS: &str = "/settings";

    // Fallback
    pub const NOT_FOUND: &str = "/404";
}

/// Which access policy applies to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Landing-type pages: anonymous and partially-onboarded users see
    /// them; fully-ready users are sent to the dashboard.
    Public,
    /// Sign-up/login screens: same redirect for ready users.
    Auth,
    /// Full product surface: requires the complete stage ladder.
    Protected,
    /// The verify-email screen.
    EmailVerification,
    /// The welcome/company-setup onboarding screens.
    Onboarding,
    /// No gating (404 and friends).
    Open,
}

/// Identifier of the screen a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    SignUp,
    Login,
    EmailVerification,
    Welcome,
    CompanySetup,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Fleet,
    Routes,
    Shipments,
    Analytics,
    Settings,
    NotFound,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteMeta {
    pub title: &'static str,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub guard: GuardKind,
    pub view: View,
    pub meta: RouteMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    Public,
    Auth,
    Protected,
    Fallback,
}

pub struct RouteGroupDef {
    pub group: RouteGroup,
    pub routes: &'static [Route],
}

const PUBLIC_ROUTES: &[Route] = &[Route {
    path: paths::HOME,
    guard: GuardKind::Public,
    view: View::Landing,
    meta: RouteMeta {
        title: "Freightline - Plataforma Logística Inteligente",
        description: Some(
            "Optimiza tus operaciones logísticas con planeación de rutas, \
             pronóstico de demanda y gestión de flota.",
        ),
    },
}];

const AUTH_ROUTES: &[Route] = &[
    Route {
        path: paths::SIGNUP,
        guard: GuardKind::Auth,
        view: View::SignUp,
        meta: RouteMeta {
            title: "Crear cuenta - Freightline",
            description: Some("Crea tu cuenta gratuita de Freightline."),
        },
    },
    Route {
        path: paths::LOGIN,
        guard: GuardKind::Auth,
        view: View::Login,
        meta: RouteMeta {
            title: "Iniciar sesión - Freightline",
            description: Some("Inicia sesión en tu cuenta de Freightline."),
        },
    },
    Route {
        path: paths::VERIFY_EMAIL,
        guard: GuardKind::EmailVerification,
        view: View::EmailVerification,
        meta: RouteMeta {
            title: "Verifica tu email - Freightline",
            description: Some("Verifica tu dirección de email para continuar."),
        },
    },
    Route {
        path: paths::WELCOME,
        guard: GuardKind::Onboarding,
        view: View::Welcome,
        meta: RouteMeta {
            title: "Bienvenido - Freightline",
            description: Some("Completa tu perfil para comenzar."),
        },
    },
    Route {
        path: paths::COMPANY_SETUP,
        guard: GuardKind::Onboarding,
        view: View::CompanySetup,
        meta: RouteMeta {
            title: "Configura tu empresa - Freightline",
            description: Some("Configura el perfil de tu empresa."),
        },
    },
    Route {
        path: paths::FORGOT_PASSWORD,
        guard: GuardKind::Auth,
        view: View::ForgotPassword,
        meta: RouteMeta {
            title: "Recuperar contraseña - Freightline",
            description: None,
        },
    },
    Route {
        path: paths::RESET_PASSWORD,
        guard: GuardKind::Auth,
        view: View::ResetPassword,
        meta: RouteMeta {
            title: "Nueva contraseña - Freightline",
            description: None,
        },
    },
];

const PROTECTED_ROUTES: &[Route] = &[
    Route {
        path: paths::DASHBOARD,
        guard: GuardKind::Protected,
        view: View::Dashboard,
        meta: RouteMeta {
            title: "Panel - Freightline",
            description: Some("Tu panel de operaciones logísticas."),
        },
    },
    Route {
        path: paths::FLEET,
        guard: GuardKind::Protected,
        view: View::Fleet,
        meta: RouteMeta {
            title: "Flota - Freightline",
            description: None,
        },
    },
    Route {
        path: paths::ROUTES,
        guard: GuardKind::Protected,
        view: View::Routes,
        meta: RouteMeta {
            title: "Rutas - Freightline",
            description: None,
        },
    },
    Route {
        path: paths::SHIPMENTS,
        guard: GuardKind::Protected,
        view: View::Shipments,
        meta: RouteMeta {
            title: "Envíos - Freightline",
            description: None,
        },
    },
    Route {
        path: paths::ANALYTICS,
        guard: GuardKind::Protected,
        view: View::Analytics,
        meta: RouteMeta {
            title: "Analítica - Freightline",
            description: None,
        },
    },
    Route {
        path: paths::SETTINGS,
        guard: GuardKind::Protected,
        view: View::Settings,
        meta: RouteMeta {
            title: "Ajustes - Freightline",
            description: None,
        },
    },
];

const FALLBACK_ROUTES: &[Route] = &[Route {
    path: paths::NOT_FOUND,
    guard: GuardKind::Open,
    view: View::NotFound,
    meta: RouteMeta {
        title: "Página no encontrada - Freightline",
        description: None,
    },
}];

pub static ROUTE_GROUPS: &[RouteGroupDef] = &[
    RouteGroupDef {
        group: RouteGroup::Public,
        routes: PUBLIC_ROUTES,
    },
    RouteGroupDef {
        group: RouteGroup::Auth,
        routes: AUTH_ROUTES,
    },
    RouteGroupDef {
        group: RouteGroup::Protected,
        routes: PROTECTED_ROUTES,
    },
    RouteGroupDef {
        group: RouteGroup::Fallback,
        routes: FALLBACK_ROUTES,
    },
];

/// All routes, flattened across groups.
pub fn all_routes() -> impl Iterator<Item = &'static Route> {
    ROUTE_GROUPS.iter().flat_map(|g| g.routes.iter())
}

/// Exact-path lookup. Unknown paths return `None`; the router maps those
/// to the fallback route.
pub fn find_by_path(path: &str) -> Option<&'static Route> {
    all_routes().find(|r| r.path == path)
}

/// The wildcard target for unknown paths.
pub fn fallback_route() -> &'static Route {
    &FALLBACK_ROUTES[0]
}
