//! Artifact integrity: SHA-256 manifest and optional Ed25519 signature.
//!
//! Layout next to the model artifact:
//! - `manifest.json`: SHA-256 digests of the bound artifact files
//! - `artifacts.sig`: Ed25519 signature over the exact manifest bytes
//!
//! Without a manifest the artifacts load unchecked, unless the policy
//! requires signed artifacts. A signature with no manifest is rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "artifacts.sig";
pub const MANIFEST_VERSION: u32 = 1;

/// Allowed clock skew for `created_at`, in seconds.
const MAX_CLOCK_SKEW_SECS: i64 = 300;

/// Signed list of artifact digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// Unix timestamp (seconds) when the manifest was written.
    pub created_at: i64,
    /// File name (relative to the manifest directory) to lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

/// Artifact bytes exactly as they were hashed, plus the manifest that bound
/// them when one exists.
#[derive(Debug)]
pub struct VerifiedArtifacts {
    pub manifest: Option<ArtifactManifest>,
    pub model: Vec<u8>,
    pub scaler: Vec<u8>,
}

/// How strictly artifacts are checked before deserialization.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    /// Refuse artifacts that lack a manifest and a valid signature.
    pub require_signed: bool,
    /// Key that signs the manifest.
    pub public_key: Option<VerifyingKey>,
}

impl IntegrityPolicy {
    /// Parse a base64-encoded 32-byte Ed25519 public key.
    ///
    /// # Errors
    /// Returns `ArtifactError::Integrity` if the key is malformed.
    pub fn parse_public_key(b64: &str) -> Result<VerifyingKey, ArtifactError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|_| ArtifactError::Integrity("Invalid public key base64".into()))?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ArtifactError::Integrity("Invalid public key length (expected 32 bytes)".into())
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| ArtifactError::Integrity("Invalid verifying key".into()))
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |diff, (x, y)| diff | (x ^ y))
        == 0
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn relative_name(dir: &Path, path: &Path) -> Result<String, ArtifactError> {
    path.strip_prefix(dir)
        .ok()
        .and_then(|rel| rel.to_str())
        .map(|rel| rel.replace('\\', "/"))
        .ok_or_else(|| {
            ArtifactError::Integrity(format!(
                "{} is outside the manifest directory {}",
                path.display(),
                dir.display()
            ))
        })
}

/// Read both artifacts once and check them against the manifest next to
/// `model_path`.
///
/// Both paths must already be canonical. The returned bytes are the ones that
/// were hashed, so callers deserialize exactly what was verified. The manifest
/// is `None` when none exists and the policy allows that.
///
/// # Errors
/// Returns `ArtifactError::NotFound`/`Io` if an artifact cannot be read, and
/// `ArtifactError::Integrity` on a missing required manifest or signature, a
/// signature without a manifest, a bad signature, or a digest mismatch.
pub fn verify_artifacts(
    policy: &IntegrityPolicy,
    model_path: &Path,
    scaler_path: &Path,
) -> Result<VerifiedArtifacts, ArtifactError> {
    let model = read_artifact(model_path)?;
    let scaler = read_artifact(scaler_path)?;

    let dir = model_path.parent().unwrap_or(model_path);
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if !manifest_path.exists() {
        if policy.require_signed {
            return Err(ArtifactError::Integrity(format!(
                "Signed artifacts required but {} is missing",
                manifest_path.display()
            )));
        }
        if sig_path.exists() {
            return Err(ArtifactError::Integrity(format!(
                "{} has no {} beside it",
                sig_path.display(),
                MANIFEST_FILE
            )));
        }
        tracing::debug!("No artifact manifest in {}, skipping integrity check", dir.display());
        return Ok(VerifiedArtifacts {
            manifest: None,
            model,
            scaler,
        });
    }

    let manifest_bytes = fs::read(&manifest_path).map_err(|source| ArtifactError::Io {
        path: manifest_path.clone(),
        source,
    })?;

    if sig_path.exists() {
        let key = policy.public_key.as_ref().ok_or_else(|| {
            ArtifactError::Integrity(
                "Artifacts are signed but no public key is configured".into(),
            )
        })?;
        let sig_bytes = fs::read(&sig_path).map_err(|source| ArtifactError::Io {
            path: sig_path.clone(),
            source,
        })?;
        let sig_bytes: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
            ArtifactError::Integrity("Invalid signature length (expected 64 bytes)".into())
        })?;
        key.verify(&manifest_bytes, &Signature::from_bytes(&sig_bytes))
            .map_err(|_| ArtifactError::Integrity("Invalid artifact signature".into()))?;
        tracing::info!("Artifact manifest signature verified");
    } else if policy.require_signed {
        return Err(ArtifactError::Integrity(format!(
            "Signed artifacts required but {} is missing",
            sig_path.display()
        )));
    } else {
        tracing::warn!("Artifact manifest is not signed; checking digests only");
    }

    let manifest: ArtifactManifest =
        serde_json::from_slice(&manifest_bytes).map_err(|e| ArtifactError::Corrupt {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactError::Integrity(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }
    if manifest.created_at > unix_now() + MAX_CLOCK_SKEW_SECS {
        return Err(ArtifactError::Integrity(
            "Manifest created_at is in the future".into(),
        ));
    }

    for (path, bytes) in [(model_path, &model), (scaler_path, &scaler)] {
        let rel = relative_name(dir, path)?;
        let expected = manifest.files.get(&rel).ok_or_else(|| {
            ArtifactError::Integrity(format!("Manifest does not bind {rel}"))
        })?;
        if !constant_time_eq_str(&sha256_hex(bytes), &expected.to_ascii_lowercase()) {
            return Err(ArtifactError::Integrity(format!("File hash mismatch for {rel}")));
        }
    }

    tracing::info!("Artifact digests verified ({} files bound)", manifest.files.len());
    Ok(VerifiedArtifacts {
        manifest: Some(manifest),
        model,
        scaler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::RngCore;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    fn write_artifacts(dir: &Path) -> (PathBuf, PathBuf) {
        let model = dir.join("model.json");
        let scaler = dir.join("scaler.json");
        fs::write(&model, b"{\"model\":1}").unwrap();
        fs::write(&scaler, b"{\"scaler\":1}").unwrap();
        (model, scaler)
    }

    fn write_manifest(dir: &Path, files: &[(&str, &[u8])]) -> Vec<u8> {
        let manifest = ArtifactManifest {
            version: MANIFEST_VERSION,
            created_at: unix_now(),
            files: files
                .iter()
                .map(|(name, bytes)| ((*name).to_string(), sha256_hex(bytes)))
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&manifest).unwrap();
        fs::write(dir.join(MANIFEST_FILE), &bytes).unwrap();
        bytes
    }

    #[test]
    fn test_no_manifest_is_allowed_by_default() {
        let temp = tempdir().unwrap();
        let (model, scaler) = write_artifacts(temp.path());
        let verified = verify_artifacts(&IntegrityPolicy::default(), &model, &scaler).unwrap();
        assert!(verified.manifest.is_none());
        assert_eq!(verified.model, b"{\"model\":1}");
        assert_eq!(verified.scaler, b"{\"scaler\":1}");

        let strict = IntegrityPolicy {
            require_signed: true,
            public_key: None,
        };
        assert!(matches!(
            verify_artifacts(&strict, &model, &scaler),
            Err(ArtifactError::Integrity(_))
        ));
    }

    #[test]
    fn test_digest_mismatch_is_rejected() {
        let temp = tempdir().unwrap();
        let (model, scaler) = write_artifacts(temp.path());
        write_manifest(
            temp.path(),
            &[("model.json", &b"{\"model\":1}"[..]), ("scaler.json", &b"tampered"[..])],
        );

        let err = verify_artifacts(&IntegrityPolicy::default(), &model, &scaler).unwrap_err();
        assert!(err.to_string().contains("scaler.json"));
    }

    #[test]
    fn test_manifest_must_bind_both_artifacts() {
        let temp = tempdir().unwrap();
        let (model, scaler) = write_artifacts(temp.path());
        write_manifest(temp.path(), &[("model.json", &b"{\"model\":1}"[..])]);

        let err = verify_artifacts(&IntegrityPolicy::default(), &model, &scaler).unwrap_err();
        assert!(err.to_string().contains("does not bind scaler.json"));
    }

    #[test]
    fn test_signed_manifest_verifies() {
        let temp = tempdir().unwrap();
        let (model, scaler) = write_artifacts(temp.path());
        let manifest_bytes = write_manifest(
            temp.path(),
            &[
                ("model.json", &b"{\"model\":1}"[..]),
                ("scaler.json", &b"{\"scaler\":1}"[..]),
            ],
        );

        let key = signing_key();
        let sig: Signature = key.sign(&manifest_bytes);
        fs::write(temp.path().join(SIGNATURE_FILE), sig.to_bytes()).unwrap();

        let policy = IntegrityPolicy {
            require_signed: true,
            public_key: Some(key.verifying_key()),
        };
        let verified = verify_artifacts(&policy, &model, &scaler).unwrap();
        let manifest = verified.manifest.expect("manifest");
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(verified.model, b"{\"model\":1}");

        // A different key must not verify.
        let other = IntegrityPolicy {
            require_signed: true,
            public_key: Some(signing_key().verifying_key()),
        };
        assert!(verify_artifacts(&other, &model, &scaler).is_err());

        // A signature without a configured key fails closed.
        assert!(verify_artifacts(&IntegrityPolicy::default(), &model, &scaler).is_err());
    }

    #[test]
    fn test_signature_without_manifest_is_rejected() {
        let temp = tempdir().unwrap();
        let (model, scaler) = write_artifacts(temp.path());
        let sig: Signature = signing_key().sign(b"orphan");
        fs::write(temp.path().join(SIGNATURE_FILE), sig.to_bytes()).unwrap();

        let err = verify_artifacts(&IntegrityPolicy::default(), &model, &scaler).unwrap_err();
        assert!(matches!(err, ArtifactError::Integrity(ref msg) if msg.contains(MANIFEST_FILE)));
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let temp = tempdir().unwrap();
        let (model, _) = write_artifacts(temp.path());
        let err = verify_artifacts(
            &IntegrityPolicy::default(),
            &model,
            &temp.path().join("absent.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_parse_public_key() {
        let key = signing_key().verifying_key();
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.to_bytes());
        assert_eq!(IntegrityPolicy::parse_public_key(&b64).unwrap(), key);
        assert!(IntegrityPolicy::parse_public_key("AAAA").is_err());
    }
}
