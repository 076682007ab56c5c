use crate::models::User;

/// Authentication state derived from the logged in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is logged in.
    Unauthenticated,
    /// A regular user is logged in.
    AuthenticatedUser,
    /// An administrator is logged in.
    AuthenticatedAdmin,
}

/// Identity of whoever is using the terminal. Never persisted.
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<User>,
}

impl Session {
    /// Logged in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// State recomputed from the current user's role.
    pub fn state(&self) -> SessionState {
        match &self.current_user {
            None => SessionState::Unauthenticated,
            Some(user) if user.is_admin() => SessionState::AuthenticatedAdmin,
            Some(_) => SessionState::AuthenticatedUser,
        }
    }

    /// Whether the current user may use the admin menus.
    pub fn is_admin(&self) -> bool {
        self.state() == SessionState::AuthenticatedAdmin
    }

    /// Whether `username` belongs to the logged in user.
    pub fn is_current(&self, username: &str) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| user.username == username)
    }

    pub(crate) fn login(&mut self, user: User) {
        self.current_user = Some(user);
    }

    pub(crate) fn logout(&mut self) -> Option<User> {
        self.current_user.take()
    }
}
