//! Dictionary resolution.
//!
//! The primary wordlist may ship compressed (rockyou.txt.gz on most
//! distributions). If the plain file is missing but a co-located `.gz`
//! variant exists, it is decompressed in place before the attack.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::info;

use crate::error::{Result, WpaError};

/// Default dictionary location.
pub const DEFAULT_WORDLIST: &str = "/usr/share/wordlists/rockyou.txt";

/// Path of the compressed sibling for `path`.
fn compressed_variant(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Resolve a usable dictionary file.
///
/// Returns the primary path, decompressing the `.gz` sibling into it if
/// needed. Fails with `DictionaryUnavailable` when neither exists.
pub fn resolve_wordlist(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let gz = compressed_variant(path);
    if !gz.is_file() {
        return Err(WpaError::DictionaryUnavailable(path.to_path_buf()));
    }

    info!(path = %gz.display(), "extracting compressed wordlist");
    let mut decoder = GzDecoder::new(File::open(&gz)?);
    let mut out = File::create(path)?;
    io::copy(&mut decoder, &mut out)?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn existing_wordlist_resolves_to_itself() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "hunter2\n").expect("write");
        let resolved = resolve_wordlist(&path).expect("resolve");
        assert_eq!(resolved, path);
    }

    #[test]
    fn compressed_variant_is_extracted() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("words.txt");
        let gz_path = dir.path().join("words.txt.gz");

        let mut encoder = GzEncoder::new(
            File::create(&gz_path).expect("create gz"),
            Compression::default(),
        );
        encoder.write_all(b"password\nhunter2\n").expect("compress");
        encoder.finish().expect("finish");

        let resolved = resolve_wordlist(&path).expect("resolve via gz");
        assert_eq!(resolved, path);
        let contents = std::fs::read_to_string(&path).expect("read extracted");
        assert_eq!(contents, "password\nhunter2\n");
    }

    #[test]
    fn both_absent_is_dictionary_unavailable() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("missing.txt");
        let err = resolve_wordlist(&path).expect_err("nothing to resolve");
        assert!(matches!(err, WpaError::DictionaryUnavailable(p) if p == path));
    }
}
