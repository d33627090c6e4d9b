//! Digest verification.

use shared_types::canon;
use shared_types::{HubError, ResultSubmission};

/// The only supported digest mode.
pub const DIGEST_MODE_SHA256: &str = "sha256";

/// Recompute the digest from the received core fields and compare
/// byte-for-byte with the submitted one.
pub fn verify_submission(submission: &ResultSubmission) -> Result<(), HubError> {
    if submission.integrity.mode != DIGEST_MODE_SHA256 {
        return Err(HubError::Integrity(format!(
            "unsupported digest mode: {}",
            submission.integrity.mode
        )));
    }

    let expected = canon::result_digest(
        &submission.job_id,
        submission.ok,
        &submission.result,
        &submission.error,
    );

    if expected.as_bytes() != submission.integrity.digest.as_bytes() {
        return Err(HubError::Integrity("digest mismatch".into()));
    }
    Ok(())
}
