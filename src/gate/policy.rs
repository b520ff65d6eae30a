//! Version comparison used by the gate.

use tracing::warn;

/// Version comparison the gate delegates to.
pub trait UpdatePolicy: Send + Sync {
    /// Whether `remote` should replace `current`.
    fn should_update(&self, current: &str, remote: &str) -> bool;

    /// Whether a shell at `current` can load a bundle requiring `minimum`.
    fn host_supports(&self, current: &str, minimum: &str) -> bool;
}

/// Parse a version string, stripping an optional `v` prefix.
pub fn parse_version(version: &str) -> Result<semver::Version, semver::Error> {
    let trimmed = version.trim();
    semver::Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
}

/// Semantic-version comparison.
///
/// - `should_update`: remote strictly greater than current. When either side
///   is not a semantic version, any difference counts as an update.
/// - `host_supports`: current greater than or equal to minimum. An
///   unparsable side is treated as supported so a bad manifest field cannot
///   force a shell update.
#[derive(Debug, Default, Clone, Copy)]
pub struct SemverPolicy;

impl UpdatePolicy for SemverPolicy {
    fn should_update(&self, current: &str, remote: &str) -> bool {
        match (parse_version(current), parse_version(remote)) {
            (Ok(current), Ok(remote)) => remote > current,
            _ => {
                warn!(current, remote, "Non-semver version, comparing as strings");
                current != remote
            }
        }
    }

    fn host_supports(&self, current: &str, minimum: &str) -> bool {
        match (parse_version(current), parse_version(minimum)) {
            (Ok(current), Ok(minimum)) => current >= minimum,
            _ => {
                warn!(current, minimum, "Cannot compare against minimum version, assuming supported");
                true
            }
        }
    }
}
