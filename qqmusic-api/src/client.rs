//! Process-scoped API context.
//!
//! [`QQMusic`] ties together the three pieces every request needs:
//!
//! 1. a [`CredentialStore`] (device identity + login credential),
//! 2. a [`ConnectionPool`] (one HTTP client per execution context),
//! 3. the [`ClientConfig`] constants.
//!
//! A request goes through [`QQMusic::get_data`]:
//!
//! ```text
//! (module, method, param, options)
//!     → envelope::build   (reads the store, never writes it)
//!     → pool.get(context) (lazily creates the context's client)
//!     → POST endpoint     (compact JSON body)
//!     → dispatch::unwrap_response → data | Authentication | DataRetrieval
//! ```
//!
//! Instances can be built explicitly with [`QQMusic::builder`] and passed to
//! whoever needs them, or shared process-wide through [`QQMusic::global`].

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::device::{DefaultFingerprint, DeviceIdentity, FingerprintSupplier};
use crate::dispatch::{self, DEFAULT_CHARSET};
use crate::envelope::{self, RequestEnvelope, RequestOptions};
use crate::error::Result;
use crate::pool::{ConnectionPool, ContextKey};
use crate::shutdown::ShutdownGuard;
use crate::store::CredentialStore;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static GLOBAL: OnceLock<QQMusic> = OnceLock::new();

/// QQ Music API context: credentials, device identity and connection pool.
#[derive(Debug)]
pub struct QQMusic {
    config: ClientConfig,
    store: CredentialStore,
    pool: ConnectionPool,
}

impl QQMusic {
    /// Anonymous instance with default configuration and fingerprint.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> QQMusicBuilder {
        QQMusicBuilder::default()
    }

    /// The process-wide instance.
    ///
    /// Created with [`QQMusic::new`] on first access unless
    /// [`init_global`](Self::init_global) installed one before. Every call
    /// returns the same instance.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Install `instance` as the process-wide instance.
    ///
    /// Only the first installation wins. Later calls leave the existing
    /// instance (and its credential) untouched and return it; use
    /// [`update_credentials`](Self::update_credentials) to change the login.
    pub fn init_global(instance: Self) -> &'static Self {
        if GLOBAL.set(instance).is_err() {
            warn!("global QQMusic instance already initialized, keeping the existing one");
        }
        Self::global()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.store.identity()
    }

    /// Snapshot of the stored credential.
    pub fn credential(&self) -> Arc<Credential> {
        self.store.credential()
    }

    /// Replace the stored credential (both fields at once).
    pub fn update_credentials(&self, credential: Credential) {
        self.store.update_credentials(credential);
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Build the request envelope without sending it.
    pub fn build_envelope(
        &self,
        module: &str,
        method: &str,
        params: Value,
        options: &RequestOptions,
    ) -> RequestEnvelope {
        let stored = self.store.credential();
        envelope::build(
            &self.config,
            self.store.identity(),
            &stored,
            module,
            method,
            params,
            options,
        )
    }

    /// Call `module.method` with `params` and return `request.data`.
    ///
    /// Uses the connection pooled for the calling thread's context.
    ///
    /// # Errors
    ///
    /// - [`QQMusicError::Authentication`](crate::QQMusicError::Authentication) — token rejected
    /// - [`QQMusicError::DataRetrieval`](crate::QQMusicError::DataRetrieval) — empty payload
    /// - [`QQMusicError::PoolClosed`](crate::QQMusicError::PoolClosed) — called after shutdown
    /// - [`QQMusicError::Http`](crate::QQMusicError::Http) / [`QQMusicError::Json`](crate::QQMusicError::Json) — transport or parse failure
    pub async fn get_data(
        &self,
        module: &str,
        method: &str,
        params: Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        self.get_data_in(ContextKey::current(), module, method, params, options)
            .await
    }

    /// Like [`get_data`](Self::get_data), pooling under an explicit context.
    pub async fn get_data_in(
        &self,
        context: ContextKey,
        module: &str,
        method: &str,
        params: Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        let envelope = self.build_envelope(module, method, params, options);
        let client = self.pool.get(context)?;
        let charset = options.charset.as_deref().unwrap_or(DEFAULT_CHARSET);
        dispatch::execute(&client, context, &self.config.endpoint, &envelope, charset).await
    }

    /// Release every pooled connection. Later requests fail with
    /// [`QQMusicError::PoolClosed`](crate::QQMusicError::PoolClosed).
    ///
    /// Safe to call any number of times, from any thread, with or without a
    /// running async runtime.
    pub fn shutdown(&self) -> usize {
        if self.pool.is_closed() {
            return 0;
        }
        let drained = self.pool.close_all();
        info!(drained, "connection pool closed");
        drained
    }

    /// Guard that calls [`shutdown`](Self::shutdown) when dropped.
    pub fn shutdown_guard(&self) -> ShutdownGuard<'_> {
        ShutdownGuard::new(self)
    }
}

impl Default for QQMusic {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`QQMusic`].
pub struct QQMusicBuilder {
    config: ClientConfig,
    credential: Credential,
    supplier: Box<dyn FingerprintSupplier>,
}

impl Default for QQMusicBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            credential: Credential::anonymous(),
            supplier: Box::new(DefaultFingerprint),
        }
    }
}

impl QQMusicBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Initial credential (anonymous by default).
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn fingerprint_supplier(mut self, supplier: impl FingerprintSupplier + 'static) -> Self {
        self.supplier = Box::new(supplier);
        self
    }

    /// Acquire the device identity and assemble the instance.
    ///
    /// No connection is opened here; clients are created on first request.
    pub fn build(self) -> QQMusic {
        let store = CredentialStore::new(self.supplier.as_ref(), self.credential);
        QQMusic {
            pool: ConnectionPool::new(self.config.clone()),
            config: self.config,
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::LoginType;
    use crate::device::{DEFAULT_FINGERPRINT, Fingerprint, StaticFingerprint};
    use crate::error::QQMusicError;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_api(response: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cgi-bin/musicu.fcg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> QQMusic {
        QQMusic::builder()
            .endpoint(format!("{}/cgi-bin/musicu.fcg", server.uri()))
            .build()
    }

    #[test]
    fn global_is_a_singleton() {
        let a = QQMusic::global();
        let b = QQMusic::global();
        assert!(std::ptr::eq(a, b));
        let c = QQMusic::init_global(QQMusic::new());
        assert!(std::ptr::eq(a, c));
    }

    #[test]
    fn builder_applies_fingerprint_and_credential() {
        let qm = QQMusic::builder()
            .fingerprint_supplier(StaticFingerprint(Fingerprint {
                q16: String::new(),
                q36: "f".repeat(36),
            }))
            .credential(Credential::new("1", "W_X_t").unwrap())
            .build();
        assert_eq!(qm.identity().fingerprint, "f".repeat(36));
        assert_eq!(qm.credential().account_id(), "1");
        assert_eq!(QQMusic::new().identity().fingerprint, DEFAULT_FINGERPRINT);
    }

    #[test]
    fn build_envelope_follows_credential_updates() {
        let qm = QQMusic::new();
        let env = qm.build_envelope("m", "x", json!({}), &RequestOptions::logged_in());
        assert_eq!(env.comm.login_type, "0");

        qm.update_credentials(Credential::new("123", "W_X_abc").unwrap());
        let env = qm.build_envelope("m", "x", json!({}), &RequestOptions::logged_in());
        assert_eq!(env.comm.qq.as_deref(), Some("123"));
        assert_eq!(env.comm.login_type, LoginType::WeChat.to_string());
    }

    #[tokio::test]
    async fn get_data_returns_payload() {
        let server = mock_api(json!({"code": 0, "request": {"code": 0, "data": {"k": 1}}})).await;
        let qm = client_for(&server);
        let data = qm
            .get_data("m", "x", json!({"a": 1}), &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(data, json!({"k": 1}));
    }

    #[tokio::test]
    async fn get_data_sends_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "comm": {"qq": "123", "authst": "Q_H_L_k", "tmeLoginType": "2"},
                "request": {"module": "mod", "method": "meth", "param": {"a": 1}}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"request": {"code": 0, "data": {"ok": true}}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let qm = QQMusic::builder()
            .endpoint(server.uri())
            .credential(Credential::new("123", "Q_H_L_k").unwrap())
            .build();
        let data = qm
            .get_data("mod", "meth", json!({"a": 1}), &RequestOptions::logged_in())
            .await
            .unwrap();
        assert_eq!(data["ok"], true);
    }

    #[tokio::test]
    async fn get_data_authentication_error() {
        let server = mock_api(json!({"request": {"code": 1000}})).await;
        let err = client_for(&server)
            .get_data("m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QQMusicError::Authentication));
    }

    #[tokio::test]
    async fn get_data_retrieval_error() {
        let server = mock_api(json!({"request": {"code": 0, "data": {}}})).await;
        let err = client_for(&server)
            .get_data("m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QQMusicError::DataRetrieval { code: 0 }));
    }

    #[tokio::test]
    async fn charset_option_overrides_response_header() {
        let mut body = br#"{"request":{"code":0,"data":{"k":""#.to_vec();
        body.extend_from_slice(&[0xD6, 0xD0]); // "中" in GBK
        body.extend_from_slice(br#""}}}"#);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body, "application/json; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let data = client_for(&server)
            .get_data("m", "x", json!({}), &RequestOptions::new().charset("gbk"))
            .await
            .unwrap();
        assert_eq!(data["k"], "中");
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;
        let err = client_for(&server)
            .get_data("m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QQMusicError::Json(_)));
    }

    #[tokio::test]
    async fn requests_share_the_context_client() {
        let server = mock_api(json!({"request": {"code": 0, "data": {"k": 1}}})).await;
        let qm = client_for(&server);
        for _ in 0..3 {
            qm.get_data("m", "x", json!({}), &RequestOptions::new())
                .await
                .unwrap();
        }
        assert_eq!(qm.pool().len(), 1);

        qm.get_data_in(ContextKey::fresh(), "m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(qm.pool().len(), 2);
    }

    #[tokio::test]
    async fn requests_fail_after_shutdown() {
        let server = mock_api(json!({"request": {"code": 0, "data": {"k": 1}}})).await;
        let qm = client_for(&server);
        qm.get_data("m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(qm.shutdown(), 1);
        assert_eq!(qm.shutdown(), 0);
        let err = qm
            .get_data("m", "x", json!({}), &RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QQMusicError::PoolClosed));
    }
}
