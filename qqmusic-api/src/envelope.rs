//! Request envelope for the unified `musicu.fcg` endpoint.
//!
//! Every call is a single JSON object:
//!
//! ```json
//! {
//!   "comm": {
//!     "ct": "11", "cv": "12060012", "v": "12060012", "tmeAppID": "qqmusic",
//!     "QIMEI36": "...", "uid": "1234567890",
//!     "format": "json", "inCharset": "utf-8", "outCharset": "utf-8",
//!     "qq": "123", "authst": "Q_H_L_...",
//!     "tmeLoginType": "2"
//!   },
//!   "request": {
//!     "module": "music.musichallSinger.SingerList",
//!     "method": "GetSingerList",
//!     "param": { ... }
//!   }
//! }
//! ```
//!
//! `qq`/`authst` are only present on logged-in requests; `tmeLoginMethod`
//! only when the caller sets one.

use crate::config::ClientConfig;
use crate::credential::{Credential, LoginType};
use crate::device::DeviceIdentity;
use serde::Serialize;
use serde_json::Value;

/// Per-call knobs accepted by [`QQMusic::get_data`](crate::QQMusic::get_data).
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// `comm.tmeLoginMethod`; omitted when `None` or zero.
    pub login_method: Option<u32>,
    /// Overrides the stored account id for this call.
    pub account_id: Option<String>,
    /// Overrides the stored auth token for this call.
    pub auth_token: Option<String>,
    /// Send `qq`/`authst` when an account id is available.
    pub need_login: bool,
    /// Login type used when the request is not authenticated.
    pub login_type: Option<LoginType>,
    /// Charset used to decode the response body (default `utf-8`).
    pub charset: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for `RequestOptions::new().need_login(true)`.
    pub fn logged_in() -> Self {
        Self::new().need_login(true)
    }

    pub fn need_login(mut self, need_login: bool) -> Self {
        self.need_login = need_login;
        self
    }

    pub fn login_method(mut self, method: u32) -> Self {
        self.login_method = Some(method);
        self
    }

    /// Use `credential` for this call instead of the stored one.
    pub fn credential(mut self, credential: &Credential) -> Self {
        self.account_id = Some(credential.account_id().to_owned());
        self.auth_token = Some(credential.auth_token().to_owned());
        self
    }

    pub fn login_type(mut self, login_type: LoginType) -> Self {
        self.login_type = Some(login_type);
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }
}

/// `comm` block.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommonParams {
    pub ct: String,
    pub cv: String,
    pub v: String,
    #[serde(rename = "tmeAppID")]
    pub app_id: String,
    #[serde(rename = "QIMEI36")]
    pub qimei36: String,
    pub uid: String,
    pub format: String,
    #[serde(rename = "inCharset")]
    pub in_charset: String,
    #[serde(rename = "outCharset")]
    pub out_charset: String,
    #[serde(rename = "tmeLoginMethod", skip_serializing_if = "Option::is_none")]
    pub login_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authst: Option<String>,
    #[serde(rename = "tmeLoginType")]
    pub login_type: String,
}

/// `request` block: which remote procedure to call and its parameters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestBody {
    pub module: String,
    pub method: String,
    pub param: Value,
}

/// Complete request body, built fresh for each call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestEnvelope {
    pub comm: CommonParams,
    pub request: RequestBody,
}

impl RequestEnvelope {
    /// Compact JSON bytes; non-ASCII text stays literal UTF-8.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Merge client constants, identity, credential and the caller's payload.
///
/// `stored` is only read; overrides in `options` take precedence.
pub fn build(
    config: &ClientConfig,
    identity: &DeviceIdentity,
    stored: &Credential,
    module: &str,
    method: &str,
    params: Value,
    options: &RequestOptions,
) -> RequestEnvelope {
    let account_id = options
        .account_id
        .as_deref()
        .unwrap_or(stored.account_id());
    let auth_token = options
        .auth_token
        .as_deref()
        .unwrap_or(stored.auth_token());

    let (qq, authst, login_type) = if options.need_login && !account_id.is_empty() {
        (
            Some(account_id.to_owned()),
            Some(auth_token.to_owned()),
            LoginType::classify(auth_token),
        )
    } else {
        (None, None, options.login_type.unwrap_or_default())
    };

    let comm = CommonParams {
        ct: config.client_type.clone(),
        cv: config.client_version.clone(),
        v: config.client_version.clone(),
        app_id: config.app_id.clone(),
        qimei36: identity.fingerprint.clone(),
        uid: identity.session_uid.clone(),
        format: "json".to_owned(),
        in_charset: "utf-8".to_owned(),
        out_charset: "utf-8".to_owned(),
        login_method: options
            .login_method
            .filter(|m| *m != 0)
            .map(|m| m.to_string()),
        qq,
        authst,
        login_type: login_type.to_string(),
    };

    RequestEnvelope {
        comm,
        request: RequestBody {
            module: module.to_owned(),
            method: method.to_owned(),
            param: params,
        },
    }
}
