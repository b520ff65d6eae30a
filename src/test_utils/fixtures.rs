//! Test fixtures for release manifests and renderer archives

use crate::asset::ChecksumVerifier;
use crate::manifest::ReleaseManifest;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Build a gzip tar archive in memory.
///
/// `files` are `(path, contents)` pairs; paths are stored as given, so a
/// valid bundle uses the `renderer/` prefix.
///
/// # Panics
///
/// Panics if the archive cannot be assembled.
#[must_use]
pub fn build_render_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).expect("append archive entry");
    }

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .expect("finish render archive")
}

/// Manifest describing `archive` as release `version`.
#[must_use]
pub fn manifest_for(version: &str, commit: &str, archive: &[u8]) -> ReleaseManifest {
    ReleaseManifest {
        version: version.to_string(),
        hash: ChecksumVerifier::compute_sha256_bytes(archive),
        commit: commit.to_string(),
        filename: format!("render-{version}.tar.gz"),
        minimum: "0.0.1".to_string(),
    }
}

/// YAML document the way releases publish it.
#[must_use]
pub fn manifest_yaml(manifest: &ReleaseManifest) -> String {
    format!(
        "version: \"{}\"\nhash: \"{}\"\ncommit: \"{}\"\nfilename: \"{}\"\nminimum: \"{}\"\n",
        manifest.version, manifest.hash, manifest.commit, manifest.filename, manifest.minimum
    )
}
