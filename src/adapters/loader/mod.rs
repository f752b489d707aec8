//! Artifact loader: reads the classifier and scaler once and caches them.
//!
//! The loader is constructed explicitly at startup and hands out
//! `Arc<ModelContext>` handles. Loading the same pair of paths twice returns
//! the same instance without touching the disk again.
//!
//! # Compatibility
//!
//! Both artifacts must accept exactly [`FEATURE_COUNT`] columns and, when they
//! record their column names, those names must equal [`FEATURE_NAMES`] in
//! order. A row encoded in a different order than the artifacts were fitted
//! on would still produce a plausible-looking probability, so this is checked
//! before anything is served.

mod integrity;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;

pub use integrity::{
    sha256_hex, verify_artifacts, ArtifactManifest, IntegrityPolicy, VerifiedArtifacts,
    MANIFEST_FILE, MANIFEST_VERSION, SIGNATURE_FILE,
};

use crate::adapters::sklearn::{ModelArtifact, StandardScaler};
use crate::domain::{FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{Classifier, FeatureScaler};

/// Errors raised while loading artifacts. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Incompatible artifact: {0}")]
    Incompatible(String),

    #[error("Artifact integrity check failed: {0}")]
    Integrity(String),
}

/// Loaded, validated, read-only model and scaler.
pub struct ModelContext {
    classifier: Box<dyn Classifier>,
    scaler: Box<dyn FeatureScaler>,
    manifest: Option<ArtifactManifest>,
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("classifier", &self.classifier.name())
            .field("n_features", &self.classifier.n_features())
            .field("verified", &self.manifest.is_some())
            .finish()
    }
}

fn check_columns(
    what: &str,
    n_features: usize,
    names: Option<&[String]>,
) -> Result<(), ArtifactError> {
    if n_features != FEATURE_COUNT {
        return Err(ArtifactError::Incompatible(format!(
            "{what} expects {n_features} features, the form encodes {FEATURE_COUNT}"
        )));
    }
    if let Some(names) = names {
        if names.len() != FEATURE_COUNT {
            return Err(ArtifactError::Incompatible(format!(
                "{what} records {} column names, the form encodes {FEATURE_COUNT}",
                names.len()
            )));
        }
        for (i, (got, expected)) in names.iter().zip(FEATURE_NAMES).enumerate() {
            if got != expected {
                return Err(ArtifactError::Incompatible(format!(
                    "{what} column {i} is {got:?}, expected {expected:?}"
                )));
            }
        }
    }
    Ok(())
}

impl ModelContext {
    /// Combine a classifier and a scaler, checking that both match the
    /// feature layout.
    ///
    /// # Errors
    /// Returns `ArtifactError::Incompatible` on a width or column-name mismatch.
    pub fn new(
        classifier: Box<dyn Classifier>,
        scaler: Box<dyn FeatureScaler>,
    ) -> Result<Self, ArtifactError> {
        check_columns("scaler", scaler.n_features(), scaler.feature_names())?;
        check_columns(
            classifier.name(),
            classifier.n_features(),
            classifier.feature_names(),
        )?;
        Ok(Self {
            classifier,
            scaler,
            manifest: None,
        })
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    #[must_use]
    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    /// Whether the artifacts were checked against a manifest.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.manifest.is_some()
    }
}

fn canonical(path: &Path) -> Result<PathBuf, ArtifactError> {
    path.canonicalize().map_err(|source| {
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

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|e| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

type PathPair = (PathBuf, PathBuf);

#[derive(Debug, Default)]
struct Cache {
    /// Keyed by the paths exactly as callers passed them.
    requested: HashMap<PathPair, Arc<ModelContext>>,
    /// Keyed by canonical paths, shared by every spelling of the same files.
    canonical: HashMap<PathPair, Arc<ModelContext>>,
}

/// Loads artifact pairs and keeps each pair for the process lifetime.
#[derive(Debug, Default)]
pub struct ArtifactLoader {
    policy: IntegrityPolicy,
    cache: Mutex<Cache>,
}

impl ArtifactLoader {
    #[must_use]
    pub fn new(policy: IntegrityPolicy) -> Self {
        Self {
            policy,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Load (or return the cached) model context for a pair of artifact paths.
    ///
    /// # Errors
    /// Returns `ArtifactError` if either file is missing, fails the integrity
    /// check, cannot be parsed, or does not match the feature layout. Nothing
    /// is cached on failure.
    pub fn load(
        &self,
        model_path: &Path,
        scaler_path: &Path,
    ) -> Result<Arc<ModelContext>, ArtifactError> {
        let requested = (model_path.to_path_buf(), scaler_path.to_path_buf());

        // The maps are only written after a complete load, so a poisoned lock
        // still holds consistent entries.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(context) = cache.requested.get(&requested) {
            tracing::debug!("Reusing cached artifacts for {:?}", requested.0);
            return Ok(Arc::clone(context));
        }

        let key = (canonical(model_path)?, canonical(scaler_path)?);
        if let Some(context) = cache.canonical.get(&key).map(Arc::clone) {
            tracing::debug!("Reusing cached artifacts for {:?}", key.0);
            cache.requested.insert(requested, Arc::clone(&context));
            return Ok(context);
        }

        let verified = verify_artifacts(&self.policy, &key.0, &key.1)?;

        let model: ModelArtifact = parse_json(&key.0, &verified.model)?;
        model.validate().map_err(|reason| ArtifactError::Corrupt {
            path: key.0.clone(),
            reason,
        })?;

        let scaler: StandardScaler = parse_json(&key.1, &verified.scaler)?;
        scaler.validate().map_err(|reason| ArtifactError::Corrupt {
            path: key.1.clone(),
            reason,
        })?;

        let mut context = ModelContext::new(Box::new(model), Box::new(scaler))?;
        context.manifest = verified.manifest;

        tracing::info!(
            "Loaded {} from {:?} and scaler from {:?} (n_features={}, verified={})",
            context.classifier.name(),
            key.0,
            key.1,
            FEATURE_COUNT,
            context.is_verified()
        );

        let context = Arc::new(context);
        cache.canonical.insert(key, Arc::clone(&context));
        cache.requested.insert(requested, Arc::clone(&context));
        Ok(context)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::sklearn::BernoulliNaiveBayes;
    use tempfile::tempdir;

    pub(crate) fn shipped_model_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("model/bernoulli_naive_bayes_model.json")
    }

    pub(crate) fn shipped_scaler_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("model/scaler.json")
    }

    fn copy_shipped(dir: &Path) -> (PathBuf, PathBuf) {
        let model = dir.join("model.json");
        let scaler = dir.join("scaler.json");
        std::fs::copy(shipped_model_path(), &model).expect("copy model");
        std::fs::copy(shipped_scaler_path(), &scaler).expect("copy scaler");
        (model, scaler)
    }

    #[test]
    fn test_load_shipped_artifacts() {
        let loader = ArtifactLoader::default();
        let context = loader
            .load(&shipped_model_path(), &shipped_scaler_path())
            .expect("Shipped artifacts should load");
        assert_eq!(context.classifier().name(), "bernoulli_naive_bayes");
        assert_eq!(context.classifier().n_features(), FEATURE_COUNT);
        assert_eq!(context.scaler().n_features(), FEATURE_COUNT);
    }

    #[test]
    fn test_repeated_load_returns_same_instance() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());

        let loader = ArtifactLoader::default();
        let first = loader.load(&model, &scaler).expect("load");

        // Corrupting the model proves the second call does not re-read disk.
        std::fs::remove_file(&model).unwrap();
        std::fs::write(&model, b"not json").unwrap();
        let second = loader.load(&model, &scaler).expect("cached load");
        assert!(Arc::ptr_eq(&first, &second));

        // The same file through a different spelling hits the same entry.
        let dotted = temp.path().join(".").join("model.json");
        let third = loader.load(&dotted, &scaler).expect("cached load");
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_cached_load_survives_removed_files() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());

        let loader = ArtifactLoader::default();
        let first = loader.load(&model, &scaler).expect("load");

        std::fs::remove_file(&model).unwrap();
        std::fs::remove_file(&scaler).unwrap();
        let second = loader.load(&model, &scaler).expect("cached load");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_artifact_fails() {
        let temp = tempdir().unwrap();
        let loader = ArtifactLoader::default();
        let err = loader
            .load(&temp.path().join("absent.json"), &shipped_scaler_path())
            .unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_artifact_fails_and_is_not_cached() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());
        std::fs::write(&scaler, b"{ \"mean\": [1.0, ").unwrap();

        let loader = ArtifactLoader::default();
        let err = loader.load(&model, &scaler).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));

        // Fix the file; the loader must read it now rather than replay an error.
        std::fs::copy(shipped_scaler_path(), &scaler).unwrap();
        assert!(loader.load(&model, &scaler).is_ok());
    }

    #[test]
    fn test_width_mismatch_is_incompatible() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());
        let small = StandardScaler {
            feature_names: None,
            mean: vec![0.0; FEATURE_COUNT - 1],
            scale: vec![1.0; FEATURE_COUNT - 1],
        };
        std::fs::write(&scaler, serde_json::to_vec(&small).unwrap()).unwrap();

        let err = ArtifactLoader::default().load(&model, &scaler).unwrap_err();
        assert!(matches!(err, ArtifactError::Incompatible(_)));
    }

    /// Claims the full width but records fewer column names.
    struct ShortNames(Vec<String>);

    impl FeatureScaler for ShortNames {
        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }

        fn feature_names(&self) -> Option<&[String]> {
            Some(&self.0)
        }

        fn transform(&self, row: &[f64]) -> Result<Vec<f64>, crate::ports::ModelError> {
            Ok(row.to_vec())
        }
    }

    #[test]
    fn test_short_column_names_are_incompatible() {
        let model: ModelArtifact =
            serde_json::from_slice(&std::fs::read(shipped_model_path()).unwrap()).unwrap();
        let names = FEATURE_NAMES[..FEATURE_COUNT - 1]
            .iter()
            .map(ToString::to_string)
            .collect();

        let err = ModelContext::new(Box::new(model), Box::new(ShortNames(names))).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ArtifactError::Incompatible(_)));
        assert!(msg.contains("17 column names"), "{msg}");
    }

    #[test]
    fn test_column_order_mismatch_is_incompatible() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());

        let mut artifact: BernoulliNaiveBayes = {
            let content = std::fs::read_to_string(&model).unwrap();
            match serde_json::from_str::<ModelArtifact>(&content).unwrap() {
                ModelArtifact::BernoulliNaiveBayes(m) => m,
                ModelArtifact::LogisticRegression(_) => panic!("unexpected kind"),
            }
        };
        if let Some(names) = artifact.feature_names.as_mut() {
            names.swap(8, 9);
        }
        let json = serde_json::to_vec(&ModelArtifact::BernoulliNaiveBayes(artifact)).unwrap();
        std::fs::write(&model, json).unwrap();

        let err = ArtifactLoader::default().load(&model, &scaler).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("column 8"), "{msg}");
    }

    #[test]
    fn test_tampered_artifact_fails_manifest_check() {
        let temp = tempdir().unwrap();
        let (model, scaler) = copy_shipped(temp.path());

        let manifest = ArtifactManifest {
            version: MANIFEST_VERSION,
            created_at: 0,
            files: [
                ("model.json".to_string(), sha256_hex(&std::fs::read(&model).unwrap())),
                ("scaler.json".to_string(), sha256_hex(b"something else")),
            ]
            .into_iter()
            .collect(),
        };
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();

        let err = ArtifactLoader::default().load(&model, &scaler).unwrap_err();
        assert!(matches!(err, ArtifactError::Integrity(_)));
    }
}
