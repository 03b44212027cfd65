//! Device identity sent with every request.
//!
//! The server expects two identifiers in `comm`:
//!
//! - `QIMEI36` — a device fingerprint (anti-abuse signal). Obtaining a real
//!   one is the job of a [`FingerprintSupplier`]; when the supplier has
//!   nothing, a well-known fallback value is used.
//! - `uid` — a random 10-digit decimal string, generated once per process.

use rand::Rng;

/// Fingerprint used when the supplier returns an empty `q36`.
pub const DEFAULT_FINGERPRINT: &str = "cc8d07a748d4be0a8b91eacd100014a1730e";

const UID_LEN: usize = 10;

/// Device fingerprint pair as returned by the fingerprint service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    pub q16: String,
    pub q36: String,
}

/// Source of device fingerprints.
pub trait FingerprintSupplier: Send + Sync {
    fn get(&self) -> Fingerprint;
}

/// Supplier that never has a fingerprint, so [`DEFAULT_FINGERPRINT`] is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFingerprint;

impl FingerprintSupplier for DefaultFingerprint {
    fn get(&self) -> Fingerprint {
        Fingerprint::default()
    }
}

/// Supplier returning a fixed, caller-provided fingerprint.
#[derive(Debug, Clone)]
pub struct StaticFingerprint(pub Fingerprint);

impl FingerprintSupplier for StaticFingerprint {
    fn get(&self) -> Fingerprint {
        self.0.clone()
    }
}

/// Immutable per-process device identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// `QIMEI36` value.
    pub fingerprint: String,
    /// `uid` value, 10 decimal digits.
    pub session_uid: String,
}

impl DeviceIdentity {
    /// Query `supplier` once and generate a fresh session uid.
    pub fn acquire(supplier: &dyn FingerprintSupplier) -> Self {
        let q36 = supplier.get().q36;
        let fingerprint = if q36.is_empty() {
            DEFAULT_FINGERPRINT.to_owned()
        } else {
            q36
        };
        Self {
            fingerprint,
            session_uid: random_uid(),
        }
    }
}

/// Generate `UID_LEN` random decimal digits.
fn random_uid() -> String {
    const DIGITS: &[u8] = b"0123456789";
    let mut rng = rand::rng();
    (0..UID_LEN)
        .map(|_| char::from(DIGITS[rng.random_range(0..DIGITS.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_is_ten_digits() {
        let uid = random_uid();
        assert_eq!(uid.len(), 10);
        assert!(uid.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn empty_fingerprint_falls_back() {
        let id = DeviceIdentity::acquire(&DefaultFingerprint);
        assert_eq!(id.fingerprint, DEFAULT_FINGERPRINT);
    }

    #[test]
    fn supplied_fingerprint_is_used() {
        let supplier = StaticFingerprint(Fingerprint {
            q16: "q16".into(),
            q36: "0123456789abcdef0123456789abcdef0123".into(),
        });
        let id = DeviceIdentity::acquire(&supplier);
        assert_eq!(id.fingerprint, "0123456789abcdef0123456789abcdef0123");
    }
}
