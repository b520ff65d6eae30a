//! Renderer bundle manifests.
//!
//! A manifest describes one published renderer bundle. The same structure is
//! used twice:
//!
//! - the **release manifest** (`manifest.yml` attached to a GitHub release,
//!   YAML), fetched by [`crate::release`];
//! - the **installed manifest** (`<update-root>/manifest.yml`, JSON), written
//!   by the installer after a successful install and read by the version gate,
//!   the retention sweeper and the entry resolver.
//!
//! If an installed manifest exists, a directory named after its `version`
//! is expected under the update root. The sweeper and the entry resolver both
//! key off that name.

mod manifest_io;

pub use manifest_io::{
    installed_manifest_path, parse_release_manifest, read_installed_manifest,
    write_installed_manifest,
};

use crate::constants::{INSTALLED_MANIFEST_FILENAME, STAGING_DIR_PREFIX};
use crate::core::UpdateError;
use crate::utils::fs::is_plain_file_name;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Descriptor of one renderer bundle release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    /// Renderer version; also the name of its directory under the update root.
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    /// Hex SHA-256 of the archive.
    #[serde(deserialize_with = "scalar_string")]
    pub hash: String,
    /// Source commit the bundle was built from.
    #[serde(deserialize_with = "scalar_string")]
    pub commit: String,
    /// Archive file name inside the release.
    #[serde(deserialize_with = "scalar_string")]
    pub filename: String,
    /// Minimum host shell version able to load this bundle.
    #[serde(deserialize_with = "scalar_string")]
    pub minimum: String,
}

impl ReleaseManifest {
    /// Reject manifests whose names cannot be used as local paths.
    ///
    /// `version` becomes a directory name and `filename` a file name, both
    /// joined onto local directories.
    pub fn validate(&self) -> Result<(), UpdateError> {
        if !is_plain_file_name(&self.version)
            || self.version.starts_with(STAGING_DIR_PREFIX)
            || is_installed_manifest_name(&self.version)
        {
            return Err(UpdateError::InvalidManifest {
                reason: format!("version '{}' is not a valid directory name", self.version),
            });
        }
        if !is_plain_file_name(&self.filename) {
            return Err(UpdateError::InvalidManifest {
                reason: format!("filename '{}' is not a plain file name", self.filename),
            });
        }
        if self.hash.is_empty() {
            return Err(UpdateError::InvalidManifest {
                reason: "hash is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Names taken by the installed manifest and its atomic-write temp file.
fn is_installed_manifest_name(name: &str) -> bool {
    let manifest = Path::new(INSTALLED_MANIFEST_FILENAME);
    Path::new(name) == manifest || Path::new(name) == manifest.with_extension("tmp")
}

/// Accept any YAML scalar as a string.
///
/// Hand-edited manifests end up with `commit: 1234567` or `minimum: 1.0`,
/// which YAML types as numbers.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        String(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::String(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}
