//! QQ Music API request core.
//!
//! Every QQ Music web API call goes through one endpoint,
//! `https://u.y.qq.com/cgi-bin/musicu.fcg`, as a JSON envelope naming a
//! server-side `module` and `method`. This crate owns the parts shared by all
//! of them: device identity, login credential, per-context connection
//! pooling, envelope construction and response unwrapping.
//!
//! ```no_run
//! use qqmusic_api::{Credential, QQMusic, RequestOptions};
//! use serde_json::json;
//!
//! # async fn run() -> qqmusic_api::Result<()> {
//! let api = QQMusic::global();
//! let _guard = api.shutdown_guard();
//!
//! api.update_credentials(Credential::new("123456", "Q_H_L_...")?);
//! let data = api
//!     .get_data(
//!         "music.musichallSinger.SingerList",
//!         "GetSingerList",
//!         json!({ "hastag": 0, "area": -100, "sex": -100, "genre": -100 }),
//!         &RequestOptions::logged_in(),
//!     )
//!     .await?;
//! println!("{data}");
//! # Ok(())
//! # }
//! ```
//!
//! # Failures
//!
//! | `request.code` | `request.data` | Error |
//! |----------------|----------------|-------|
//! | 1000           | any            | [`QQMusicError::Authentication`] |
//! | other          | empty / absent | [`QQMusicError::DataRetrieval`] |
//!
//! Nothing is retried; transport and JSON errors surface as
//! [`QQMusicError::Http`] and [`QQMusicError::Json`].
//!
//! # TLS
//!
//! Pooled clients accept any server certificate, like the web client this
//! crate talks on behalf of. Do not send anything through them that needs
//! server authentication.

pub mod client;
pub mod config;
pub mod credential;
pub mod device;
mod dispatch;
pub mod envelope;
pub mod error;
pub mod pool;
pub mod shutdown;
mod singer;
pub mod store;
pub mod types;

pub use client::{QQMusic, QQMusicBuilder};
pub use config::ClientConfig;
pub use credential::{Credential, LoginType};
pub use device::{DeviceIdentity, Fingerprint, FingerprintSupplier};
pub use dispatch::unwrap_response;
pub use envelope::RequestOptions;
pub use error::{QQMusicError, Result};
pub use pool::ContextKey;
pub use singer::Singer;
