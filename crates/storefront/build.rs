//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet and the script bundle so both can be served
//! with long-lived cache headers. Each asset is copied to a `derived/`
//! sibling directory as `<stem>.<hash>.<ext>` and the hash is exported as a
//! compile-time environment variable.

#![allow(clippy::print_stdout)]

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Static assets to fingerprint, relative to the crate root, with the
/// environment variable that receives their hash.
const ASSETS: &[(&str, &str)] = &[
    ("static/css/main.css", "CSS_HASH"),
    ("static/js/app.js", "JS_HASH"),
];

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set; skipping asset hashing");
        return;
    };
    let root = PathBuf::from(manifest_dir);

    for (relative, var) in ASSETS {
        let source = root.join(relative);
        println!("cargo:rerun-if-changed={}", source.display());

        match fingerprint(&source) {
            Ok(hash) => println!("cargo:rustc-env={var}={hash}"),
            Err(e) => {
                println!("cargo:warning=Could not fingerprint {relative}: {e}");
                println!("cargo:rustc-env={var}=");
            }
        }
    }
}

/// Hash an asset and place the fingerprinted copy next to it.
///
/// Returns the first 8 hex characters of the SHA-256 digest.
fn fingerprint(source: &Path) -> io::Result<String> {
    let content = fs::read(source)?;
    let digest = format!("{:x}", Sha256::digest(&content));
    let hash: String = digest.chars().take(8).collect();

    let (Some(dir), Some(stem), Some(ext)) = (
        source.parent(),
        source.file_stem().and_then(|s| s.to_str()),
        source.extension().and_then(|s| s.to_str()),
    ) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "asset path needs a directory, stem and extension",
        ));
    };

    let derived = dir.join("derived");
    fs::create_dir_all(&derived)?;
    fs::write(derived.join(format!("{stem}.{hash}.{ext}")), &content)?;
    Ok(hash)
}
