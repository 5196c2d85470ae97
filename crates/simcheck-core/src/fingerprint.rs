//! Content fingerprinting: cumulative digest and vector expansion.
//!
//! A fingerprint is a reproducible, fixed-size summary of a working copy's
//! tracked content: one SHA-256 digest over all file bytes in canonical
//! order, expanded into a small feature vector for cheap cosine comparison.
//! The expansion is not a cryptographic property; it exists so two
//! repositories can be compared without retaining their raw content.

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::materialize::Checkout;

/// Default fingerprint vector dimension.
pub const VECTOR_DIMS: usize = 64;

/// Reproducible fixed-size summary of a repository's tracked content.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// Cumulative SHA-256 over file bytes in canonical order.
    pub digest: [u8; 32],
    /// Deterministic expansion of the digest, `dims` entries.
    pub vector: Vec<f64>,
    /// Files that could not be read and were left out of the digest.
    pub skipped_files: usize,
}

impl Fingerprint {
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Fingerprint a working copy.
///
/// Feeds the raw bytes of every tracked file, in the checkout's canonical
/// order, into a single SHA-256 context. A file that cannot be read is
/// skipped and counted, not failed: one unreadable file must never abort a
/// whole report.
///
/// Reads go through `tokio::fs` so a large checkout does not pin a runtime
/// worker while hashing many files.
pub async fn fingerprint_checkout(checkout: &Checkout, dims: usize) -> Fingerprint {
    let mut hasher = Sha256::new();
    let mut skipped = 0usize;

    for rel in &checkout.files {
        match tokio::fs::read(checkout.root().join(rel)).await {
            Ok(bytes) => hasher.update(&bytes),
            Err(err) => {
                warn!(file = %rel, error = %err, "skipping unreadable file");
                skipped += 1;
            }
        }
    }

    let digest: [u8; 32] = hasher.finalize().into();
    Fingerprint {
        vector: expand_vector(&digest, dims),
        digest,
        skipped_files: skipped,
    }
}

/// Expand a digest into a `dims`-dimensional feature vector.
///
/// Byte `i` folds into dimension `i % dims`, accumulating `byte / 255`;
/// each dimension is then normalized by the number of folding passes.
/// Pure function of `(digest, dims)`. A zero `dims` is a programmer error.
pub fn expand_vector(digest: &[u8], dims: usize) -> Vec<f64> {
    assert!(dims > 0, "vector dimension must be positive");

    let mut vector = vec![0.0f64; dims];
    for (i, byte) in digest.iter().enumerate() {
        vector[i % dims] += f64::from(*byte) / 255.0;
    }

    let passes = digest.len().div_ceil(dims).max(1) as f64;
    for dim in &mut vector {
        *dim /= passes;
    }
    vector
}

/// Cosine similarity between two vectors: `dot(a,b) / (|a| * |b|)`.
///
/// Defined as `0.0` when either magnitude is zero, which treats an all-zero
/// fingerprint as maximally dissimilar to everything, including itself.
/// Fingerprint vectors accumulate non-negative terms, so results land in
/// [0, 1]; no clamping is applied.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn checkout_with(files: &[(&str, &str)]) -> (TempDir, Checkout) {
        let dir = TempDir::new().unwrap();
        let mut names = Vec::new();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(full, content).unwrap();
            names.push(path.to_string());
        }
        let checkout = Checkout::borrowed(names, dir.path());
        (dir, checkout)
    }

    #[tokio::test]
    async fn fingerprint_is_deterministic() {
        let (_dir, checkout) = checkout_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);

        let first = fingerprint_checkout(&checkout, VECTOR_DIMS).await;
        let second = fingerprint_checkout(&checkout, VECTOR_DIMS).await;

        assert_eq!(first.digest, second.digest);
        assert_eq!(first.vector, second.vector);
        assert_eq!(first.skipped_files, 0);
    }

    #[tokio::test]
    async fn identical_content_identical_fingerprint() {
        let (_d1, left) = checkout_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        let (_d2, right) = checkout_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);

        let fp_left = fingerprint_checkout(&left, VECTOR_DIMS).await;
        let fp_right = fingerprint_checkout(&right, VECTOR_DIMS).await;
        assert_eq!(fp_left.digest, fp_right.digest);
        assert_eq!(fp_left.vector, fp_right.vector);
    }

    #[tokio::test]
    async fn single_byte_delta_changes_digest() {
        let (_d1, left) = checkout_with(&[("a.txt", "alpha")]);
        let (_d2, right) = checkout_with(&[("a.txt", "alphb")]);

        let fp_left = fingerprint_checkout(&left, VECTOR_DIMS).await;
        let fp_right = fingerprint_checkout(&right, VECTOR_DIMS).await;
        assert_ne!(fp_left.digest, fp_right.digest);
    }

    #[tokio::test]
    async fn unreadable_file_is_skipped_not_fatal() {
        let (dir, _ignored) = checkout_with(&[("a.txt", "alpha")]);
        // List a path that does not exist on disk: the read fails and the
        // file is skipped, leaving the digest equal to the readable subset.
        let with_ghost = Checkout::borrowed(
            vec!["a.txt".to_string(), "ghost.txt".to_string()],
            dir.path(),
        );
        let only_real = Checkout::borrowed(vec!["a.txt".to_string()], dir.path());

        let fp_ghost = fingerprint_checkout(&with_ghost, VECTOR_DIMS).await;
        let fp_real = fingerprint_checkout(&only_real, VECTOR_DIMS).await;

        assert_eq!(fp_ghost.skipped_files, 1);
        assert_eq!(fp_ghost.digest, fp_real.digest);
    }

    #[test]
    fn expand_vector_has_requested_dimension() {
        let digest = [7u8; 32];
        assert_eq!(expand_vector(&digest, 64).len(), 64);
        assert_eq!(expand_vector(&digest, 8).len(), 8);
    }

    #[test]
    fn expand_vector_folds_and_normalizes() {
        // 4 bytes into 2 dims: two folding passes, each dim averages
        // its two contributing bytes.
        let digest = [255u8, 0, 255, 255];
        let vector = expand_vector(&digest, 2);
        assert!((vector[0] - 1.0).abs() < 1e-12);
        assert!((vector[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "vector dimension must be positive")]
    fn expand_vector_zero_dims_panics() {
        expand_vector(&[1u8, 2, 3], 0);
    }

    #[test]
    fn cosine_self_similarity_is_one() {
        let v = expand_vector(&[1u8, 2, 3, 4, 5], 8);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_zero_vector_scores_zero() {
        let zero = vec![0.0; 8];
        let other = expand_vector(&[9u8; 16], 8);
        assert_eq!(cosine_similarity(&zero, &other), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn cosine_stays_in_unit_interval_for_fingerprints() {
        let a = expand_vector(&[1u8, 200, 30, 77, 250, 14], 8);
        let b = expand_vector(&[99u8, 3, 180, 42], 8);
        let similarity = cosine_similarity(&a, &b);
        assert!((0.0..=1.0 + 1e-12).contains(&similarity));
    }
}
