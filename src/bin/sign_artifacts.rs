//! Signing utility for HeartCheck model artifacts.
//!
//! # Usage
//!
//! ```bash
//! # Generate an Ed25519 keypair
//! cargo run --bin sign_artifacts -- keygen --out-seed <path> [--out-pub <path>] [--force]
//!
//! # Bind the model and scaler in manifest.json and sign it (artifacts.sig)
//! HEARTCHECK_SIGNING_KEY_B64_FILE=<seed> \
//!   cargo run --bin sign_artifacts -- sign <dir> [--model <file>] [--scaler <file>]
//! ```
//!
//! The seed is written with 0600 permissions and wiped from memory after use.
//! Only non-secret material is printed.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use heartcheck::adapters::loader::{
    sha256_hex, verify_artifacts, ArtifactManifest, IntegrityPolicy, MANIFEST_FILE,
    MANIFEST_VERSION, SIGNATURE_FILE,
};

const KEY_FILE_ENV: &str = "HEARTCHECK_SIGNING_KEY_B64_FILE";
const DEFAULT_MODEL_FILE: &str = "bernoulli_naive_bayes_model.json";
const DEFAULT_SCALER_FILE: &str = "scaler.json";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn usage() -> String {
    "Usage:\n  sign_artifacts keygen --out-seed <path> [--out-pub <path>] [--force]\n  \
     sign_artifacts sign <dir> [--model <file>] [--scaler <file>]"
        .to_string()
}

fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    file.write_all(contents)
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| format!("Failed to write {path:?}: {e}"))
}

fn keygen(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    let mut out_seed: Option<PathBuf> = None;
    let mut out_pub: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-seed" => out_seed = Some(args.next().ok_or_else(usage)?.into()),
            "--out-pub" => out_pub = Some(args.next().ok_or_else(usage)?.into()),
            "--force" => force = true,
            _ => return Err(format!("Unknown arg: {arg}\n{}", usage())),
        }
    }
    let out_seed = out_seed.ok_or_else(usage)?;

    for path in std::iter::once(&out_seed).chain(out_pub.as_ref()) {
        if path.exists() && !force {
            return Err(format!(
                "Refusing to overwrite existing file {path:?}. Use --force."
            ));
        }
    }

    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);
    let verifying_key = SigningKey::from_bytes(&seed.0).verifying_key();

    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));
    write_file(&out_seed, seed_b64.as_bytes(), 0o600)?;
    println!("Wrote signing seed (base64) to {out_seed:?}");

    let pub_b64 = general_purpose::STANDARD.encode(verifying_key.as_bytes());
    if let Some(pub_path) = &out_pub {
        // Public key is non-secret; allow read access.
        write_file(pub_path, pub_b64.as_bytes(), 0o644)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }
    println!("HEARTCHECK_ARTIFACT_PUBKEY_B64={pub_b64}");

    Ok(())
}

fn read_signing_seed() -> Result<Seed, String> {
    let path = env::var(KEY_FILE_ENV)
        .map_err(|_| format!("Missing signing key. Set {KEY_FILE_ENV} to the seed file."))?;
    let content = Zeroizing::new(
        fs::read_to_string(path.trim())
            .map_err(|e| format!("Failed reading signing key file: {e}"))?,
    );

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(content.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );
    if raw.len() != 32 {
        return Err(format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        ));
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn sign(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    let mut dir: Option<PathBuf> = None;
    let mut model = DEFAULT_MODEL_FILE.to_string();
    let mut scaler = DEFAULT_SCALER_FILE.to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model = args.next().ok_or_else(usage)?,
            "--scaler" => scaler = args.next().ok_or_else(usage)?,
            _ if dir.is_none() => dir = Some(arg.into()),
            _ => return Err(usage()),
        }
    }
    let dir = dir.ok_or_else(usage)?;

    let mut files = BTreeMap::new();
    for rel in [&model, &scaler] {
        let path = dir.join(rel);
        let bytes = fs::read(&path).map_err(|e| format!("Failed to read {path:?}: {e}"))?;
        files.insert(rel.clone(), sha256_hex(&bytes));
    }

    let manifest = ArtifactManifest {
        version: MANIFEST_VERSION,
        created_at: chrono::Utc::now().timestamp(),
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .map_err(|e| format!("Failed to write {sig_path:?}: {e}"))?;

    // Check the result the same way the application will.
    let policy = IntegrityPolicy {
        require_signed: true,
        public_key: Some(signing_key.verifying_key()),
    };
    let canonical = |rel: &str| {
        dir.join(rel)
            .canonicalize()
            .map_err(|e| format!("Failed to resolve {rel}: {e}"))
    };
    verify_artifacts(&policy, &canonical(&model)?, &canonical(&scaler)?)
        .map_err(|e| format!("Self-check failed: {e}"))?;

    println!("Signed manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "HEARTCHECK_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}

fn main() -> Result<(), String> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("keygen") => keygen(args),
        Some("sign") => sign(args),
        Some("-h" | "--help") => {
            println!("{}", usage());
            Ok(())
        }
        _ => Err(usage()),
    }
}
