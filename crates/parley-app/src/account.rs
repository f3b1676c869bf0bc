//! User panel: the signed-in user's name, avatar and account menu.

use parley_core::BackendError;

use crate::{LocalUser, SessionError};

/// Identity provider session control.
pub trait Authenticator {
    /// End the signed-in session.
    fn sign_out(&mut self) -> Result<(), BackendError>;
}

/// Entries of the user menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMenuOption {
    /// Open the avatar upload modal.
    ChangeAvatar,
    /// End the session.
    SignOut,
}

impl UserMenuOption {
    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ChangeAvatar => "Change Avatar",
            Self::SignOut => "Sign Out",
        }
    }
}

/// Sidebar header for the signed-in user.
#[derive(Debug, Clone)]
pub struct UserPanel {
    user: LocalUser,
}

impl UserPanel {
    /// Panel for `user`.
    pub fn new(user: LocalUser) -> Self {
        Self { user }
    }

    /// Display name.
    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    /// Avatar URL, if any.
    pub fn avatar(&self) -> Option<&str> {
        self.user.avatar.as_deref()
    }

    /// Menu entries in display order.
    pub fn menu_options(&self) -> [UserMenuOption; 2] {
        [UserMenuOption::ChangeAvatar, UserMenuOption::SignOut]
    }

    /// Sign the user out through `auth`.
    pub fn sign_out<A: Authenticator>(&self, auth: &mut A) -> Result<(), SessionError> {
        match auth.sign_out() {
            Ok(()) => {
                tracing::info!(user = %self.user.id, "signed out");
                Ok(())
            },
            Err(e) => {
                tracing::warn!(user = %self.user.id, error = %e, "sign out failed");
                Err(e.into())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAuth {
        calls: usize,
        result: Result<(), BackendError>,
    }

    impl Authenticator for MockAuth {
        fn sign_out(&mut self) -> Result<(), BackendError> {
            self.calls += 1;
            self.result.clone()
        }
    }

    #[test]
    fn panel_exposes_profile_and_menu() {
        let panel = UserPanel::new(LocalUser::new("u1", "Ada").with_avatar("http://img/a.png"));

        assert_eq!(panel.display_name(), "Ada");
        assert_eq!(panel.avatar(), Some("http://img/a.png"));
        let labels: Vec<_> = panel.menu_options().iter().map(|o| o.label()).collect();
        assert_eq!(labels, ["Change Avatar", "Sign Out"]);
    }

    #[test]
    fn sign_out_delegates() {
        let panel = UserPanel::new(LocalUser::new("u1", "Ada"));
        let mut auth = MockAuth { calls: 0, result: Ok(()) };

        panel.sign_out(&mut auth).unwrap();
        assert_eq!(auth.calls, 1);
    }

    #[test]
    fn sign_out_failure_is_returned() {
        let panel = UserPanel::new(LocalUser::new("u1", "Ada"));
        let mut auth = MockAuth { calls: 0, result: Err(BackendError::Disconnected) };

        let err = panel.sign_out(&mut auth).unwrap_err();
        assert_eq!(err, SessionError::Backend(BackendError::Disconnected));
    }
}
