//! Account credential and login-type classification.
//!
//! A QQ Music credential is the pair `(musicid, musickey)`. On the wire the
//! pair travels as `comm.qq` / `comm.authst`, together with `tmeLoginType`
//! telling the server which login scheme issued the key.

use crate::error::{QQMusicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker embedded in keys issued through WeChat login.
const WECHAT_KEY_MARKER: &str = "W_X";

/// Authentication pair used for logged-in requests.
///
/// Either both fields are empty (anonymous) or both are set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    account_id: String,
    auth_token: String,
}

impl Credential {
    /// Build a credential, rejecting a half-filled pair.
    pub fn new(account_id: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let account_id = account_id.into();
        let auth_token = auth_token.into();
        if account_id.is_empty() != auth_token.is_empty() {
            return Err(QQMusicError::InvalidCredential);
        }
        Ok(Self {
            account_id,
            auth_token,
        })
    }

    /// The anonymous (empty) credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.account_id.is_empty()
    }
}

// Keep the token out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account_id", &self.account_id)
            .field("auth_token", &if self.auth_token.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// Value of `comm.tmeLoginType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoginType {
    /// No login, public endpoints only.
    #[default]
    Anonymous = 0,
    /// Key issued by WeChat login.
    WeChat = 1,
    /// Key issued by QQ login.
    QQ = 2,
}

impl LoginType {
    /// Infer the login scheme from an auth token.
    ///
    /// Tokens containing `W_X` come from WeChat login, everything else is
    /// treated as a QQ login key.
    pub fn classify(auth_token: &str) -> Self {
        if auth_token.contains(WECHAT_KEY_MARKER) {
            Self::WeChat
        } else {
            Self::QQ
        }
    }

    /// Numeric wire code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LoginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_half_filled_pair() {
        assert!(matches!(
            Credential::new("123", ""),
            Err(QQMusicError::InvalidCredential)
        ));
        assert!(matches!(
            Credential::new("", "key"),
            Err(QQMusicError::InvalidCredential)
        ));
    }

    #[test]
    fn empty_pair_is_anonymous() {
        let cred = Credential::new("", "").unwrap();
        assert_eq!(cred, Credential::anonymous());
        assert!(!cred.is_authenticated());
    }

    #[test]
    fn classify_by_marker() {
        assert_eq!(LoginType::classify("W_X_abc"), LoginType::WeChat);
        assert_eq!(LoginType::classify("Q_H_L_abc"), LoginType::QQ);
        assert_eq!(LoginType::classify("other"), LoginType::QQ);
        assert_eq!(LoginType::WeChat.to_string(), "1");
        assert_eq!(LoginType::Anonymous.to_string(), "0");
    }

    #[test]
    fn debug_hides_token() {
        let cred = Credential::new("123", "secret").unwrap();
        let printed = format!("{cred:?}");
        assert!(printed.contains("123"));
        assert!(!printed.contains("secret"));
    }
}
