//! Credential store: device identity plus the swappable login credential.

use crate::credential::Credential;
use crate::device::{DeviceIdentity, FingerprintSupplier};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Holds the [`DeviceIdentity`] and the current [`Credential`].
///
/// The identity is fixed at construction. The credential is kept as an
/// `Arc<Credential>` and replaced as a whole, so a reader always sees a
/// consistent `(account_id, auth_token)` pair.
#[derive(Debug)]
pub struct CredentialStore {
    identity: DeviceIdentity,
    credential: RwLock<Arc<Credential>>,
}

impl CredentialStore {
    /// Acquire the device identity from `supplier` and store `credential`.
    pub fn new(supplier: &dyn FingerprintSupplier, credential: Credential) -> Self {
        Self {
            identity: DeviceIdentity::acquire(supplier),
            credential: RwLock::new(Arc::new(credential)),
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Snapshot of the current credential.
    pub fn credential(&self) -> Arc<Credential> {
        Arc::clone(
            &self
                .credential
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Replace the credential. Both fields change in one step.
    pub fn update_credentials(&self, credential: Credential) {
        info!(account_id = credential.account_id(), "updating credentials");
        let next = Arc::new(credential);
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DefaultFingerprint;
    use std::thread;

    #[test]
    fn update_then_read() {
        let store = CredentialStore::new(&DefaultFingerprint, Credential::anonymous());
        assert!(!store.credential().is_authenticated());

        store.update_credentials(Credential::new("123", "Q_H_L_key").unwrap());
        let cred = store.credential();
        assert_eq!(cred.account_id(), "123");
        assert_eq!(cred.auth_token(), "Q_H_L_key");
    }

    #[test]
    fn identity_is_stable_across_updates() {
        let store = CredentialStore::new(&DefaultFingerprint, Credential::anonymous());
        let before = store.identity().clone();
        store.update_credentials(Credential::new("1", "t").unwrap());
        assert_eq!(store.identity(), &before);
    }

    #[test]
    fn concurrent_readers_never_see_torn_pair() {
        let store = Arc::new(CredentialStore::new(
            &DefaultFingerprint,
            Credential::new("111", "token-111").unwrap(),
        ));

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..2000 {
                    let cred = if i % 2 == 0 {
                        Credential::new("222", "token-222").unwrap()
                    } else {
                        Credential::new("111", "token-111").unwrap()
                    };
                    store.update_credentials(cred);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let cred = store.credential();
                        assert_eq!(
                            cred.auth_token(),
                            format!("token-{}", cred.account_id())
                        );
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }
}
