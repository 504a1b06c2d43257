//! Layout shells and the admin route table, resolved as data. The public
//! `Auth` layout hosts login at the root; everything under `/admin` renders in
//! the `Admin` layout behind the [`AuthGuard`].

use crate::guard::{AuthGuard, Navigation, SessionStatus};
use tracing::debug;

pub mod paths {
    pub const ROOT: &str = "/";
    pub const ADMIN: &str = "/admin";
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    pub const ADMIN_NOT_FOUND: &str = "/admin/not-found";
}

const MAX_REDIRECTS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Public shell around the login page.
    Auth,
    /// Guarded shell around the admin pages.
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    Dashboard,
    NotFound,
}

impl Page {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::NotFound => "Not Found",
        }
    }
}

/// What an admin child path maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteTarget {
    Page(Page),
    /// Redirect to another child path, relative to `/admin`.
    Redirect(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdminRoute {
    pub path: &'static str,
    pub target: RouteTarget,
}

/// Children of `/admin`, matched in order on the full child path.
pub const ADMIN_ROUTES: &[AdminRoute] = &[
    AdminRoute {
        path: "dashboard",
        target: RouteTarget::Redirect(""),
    },
    AdminRoute {
        path: "",
        target: RouteTarget::Page(Page::Dashboard),
    },
    AdminRoute {
        path: "not-found",
        target: RouteTarget::Page(Page::NotFound),
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render {
        layout: Layout,
        page: Page,
        title: &'static str,
    },
    Redirect(String),
}

impl Resolution {
    fn render(layout: Layout, page: Page) -> Self {
        Self::Render {
            layout,
            page,
            title: page.title(),
        }
    }
}

pub struct Router<S> {
    guard: AuthGuard<S>,
}

impl<S: SessionStatus> Router<S> {
    #[must_use]
    pub fn new(guard: AuthGuard<S>) -> Self {
        Self { guard }
    }

    /// Resolves one navigation step. Admin paths consult the guard before the
    /// route table.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = normalize(path);

        let Some(child) = admin_child(&path) else {
            return if path == paths::ROOT {
                Resolution::render(Layout::Auth, Page::Login)
            } else {
                Resolution::render(Layout::Auth, Page::NotFound)
            };
        };

        if let Navigation::Redirect(target) = self.guard.check() {
            return Resolution::Redirect(target);
        }

        match ADMIN_ROUTES.iter().find(|route| route.path == child) {
            Some(AdminRoute {
                target: RouteTarget::Page(page),
                ..
            }) => Resolution::render(Layout::Admin, *page),
            Some(AdminRoute {
                target: RouteTarget::Redirect(to),
                ..
            }) => Resolution::Redirect(admin_path(to)),
            None => Resolution::render(Layout::Admin, Page::NotFound),
        }
    }

    /// Follows redirects until a page renders, returning the final path with
    /// its resolution. Stops after a few hops and returns the pending redirect.
    #[must_use]
    pub fn navigate(&self, path: &str) -> (String, Resolution) {
        let mut current = normalize(path);
        let mut resolution = self.resolve(&current);

        for _ in 0..MAX_REDIRECTS {
            let Resolution::Redirect(next) = &resolution else {
                break;
            };
            debug!("redirect {} -> {}", current, next);
            current = next.clone();
            resolution = self.resolve(&current);
        }

        (current, resolution)
    }
}

/// Drops query and fragment, collapses trailing slashes, ensures a leading one.
fn normalize(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches('/');

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn admin_child(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(paths::ADMIN)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

fn admin_path(child: &str) -> String {
    if child.is_empty() {
        paths::ADMIN.to_string()
    } else {
        format!("{}/{child}", paths::ADMIN)
    }
}
