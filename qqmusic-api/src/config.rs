//! Client configuration.
//!
//! Defaults reproduce the Android client `12.6.0` the API expects. Only
//! [`endpoint`](ClientConfig::endpoint) and the timeouts are normally worth
//! changing (e.g. pointing at a local mock server in tests).

use std::time::Duration;

/// Unified request endpoint.
pub const API_ENDPOINT: &str = "https://u.y.qq.com/cgi-bin/musicu.fcg";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Static settings shared by every request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL every envelope is POSTed to.
    pub endpoint: String,
    /// `User-Agent` header of pooled clients.
    pub user_agent: String,
    /// `comm.ct`.
    pub client_type: String,
    /// `comm.cv` and `comm.v`.
    pub client_version: String,
    /// `comm.tmeAppID`.
    pub app_id: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: API_ENDPOINT.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            client_type: "11".to_owned(),
            client_version: "12060012".to_owned(),
            app_id: "qqmusic".to_owned(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}
