/// Sound file resolution
///
/// Maps a logical sound reference (`ambiance/wind.ogg`, `ui/click`) to a
/// concrete file on disk.
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

/// Path prefix under which classic variants of every sound live
pub const CLASSIC_PREFIX: &str = "classic/";

/// Extensions tried, in order, for references without one
const KNOWN_EXTENSIONS: [&str; 4] = ["ogg", "wav", "mp3", "flac"];

/// Resolves logical references to existing files
pub trait FileResolver {
    fn resolve(&self, reference: &str) -> Option<PathBuf>;
}

/// Classic form of a reference
pub fn classic_variant(reference: &str) -> String {
    format!("{}{}", CLASSIC_PREFIX, reference.trim_start_matches('/'))
}

/// Modern form of a reference already in classic form
pub fn reverse_classic(reference: &str) -> Option<&str> {
    reference
        .trim_start_matches('/')
        .strip_prefix(CLASSIC_PREFIX)
        .filter(|rest| !rest.is_empty())
}

/// References to try for a request, in order
pub fn candidates(reference: &str, classic_audio: bool) -> Vec<String> {
    let mut out = Vec::with_capacity(3);
    if classic_audio && reverse_classic(reference).is_none() {
        out.push(classic_variant(reference));
    }
    out.push(reference.to_string());
    if let Some(modern) = reverse_classic(reference) {
        out.push(modern.to_string());
    }
    out
}

/// Resolver over a sound directory
///
/// A file whose stem has no trailing digits also matches numbered siblings:
/// `hit.ogg` may resolve to any of `hit.ogg`, `hit1.ogg`, `hit2.ogg`.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Every existing file the reference may stand for
    pub fn matches(&self, reference: &str) -> Vec<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        let base = self.root.join(relative);

        if base.extension().is_some() {
            return self.with_variants(&base);
        }

        KNOWN_EXTENSIONS
            .iter()
            .map(|ext| self.with_variants(&base.with_extension(ext)))
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    fn with_variants(&self, path: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        if path.is_file() {
            found.push(path.to_path_buf());
        }

        let (Some(stem), Some(dir)) = (path.file_stem().and_then(|s| s.to_str()), path.parent()) else {
            return found;
        };
        if stem.ends_with(|c: char| c.is_ascii_digit()) {
            return found;
        }
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

        let Ok(read_dir) = fs::read_dir(dir) else {
            return found;
        };
        let mut variants: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|candidate| candidate.is_file() && is_numbered_variant(candidate, stem, extension))
            .collect();
        variants.sort();
        found.extend(variants);
        found
    }
}

fn is_numbered_variant(candidate: &Path, stem: &str, extension: &str) -> bool {
    let candidate_ext = candidate.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !candidate_ext.eq_ignore_ascii_case(extension) {
        return false;
    }
    candidate
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix(stem))
        .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
}

impl FileResolver for DirectoryResolver {
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let matches = self.matches(reference);
        let picked = matches.choose(&mut rand::thread_rng()).cloned();
        if matches.len() > 1 {
            tracing::trace!("{} has {} variants, picked {:?}", reference, matches.len(), picked);
        }
        picked
    }
}
