use std::{io, num::ParseIntError};

use thiserror::Error;

use crate::store::StoreError;

/// Everything that can end a dispatcher iteration early.
///
/// `Escape`, `Restart` and `Exit` are control signals rather than failures and
/// are never shown to the user; see [`DispatchError::is_signal`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A keyword aborted the current input flow.
    #[error("input flow cancelled")]
    Escape,
    /// Registration finished; the user has to log in with the new account.
    #[error("account created, log in to continue")]
    Restart,
    /// The user asked to quit.
    #[error("exit requested")]
    Exit,
    /// Menu selection did not match any option.
    #[error("session: unrecognised command: {0}")]
    UnrecognisedCommand(String),
    /// Index above the end of a selection list.
    #[error("session: invalid selection, please try again")]
    InvalidSelection,
    /// Index that does not map onto any list entry.
    #[error("session: selection {0} was not found")]
    SelectionNotFound(i64),
    /// Selection that is not an integer.
    #[error("session: {input:?} is not a number")]
    NotANumber {
        /// Raw text typed by the user.
        input: String,
        /// Parse failure.
        #[source]
        source: ParseIntError,
    },
    /// Unknown username or wrong password.
    #[error("session: username and password did not match, please try again")]
    IncorrectCredentials,
    /// An admin tried to remove their own account.
    #[error("session: cannot delete own user, please try again")]
    SelfDelete,
    /// An admin tried to change their own role.
    #[error("session: cannot modify own user's role, please try again")]
    SelfRoleEdit,
    /// Account or customer store rejected the change.
    #[error("session: {0}")]
    Store(#[from] StoreError),
    /// Password hashing failed.
    #[error("session: password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    /// Reading from the terminal failed.
    #[error("session: terminal: {0}")]
    Terminal(#[from] io::Error),
}

impl DispatchError {
    /// Control signals unwind to the outer loop without being reported.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            DispatchError::Escape | DispatchError::Restart | DispatchError::Exit
        )
    }

    /// Errors after which no further input can be read.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchError::Terminal(err) if err.kind() == io::ErrorKind::UnexpectedEof)
    }
}
