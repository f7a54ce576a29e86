//! Signed-URL completeness check.
//!
//! Screenshot providers hand out signed cloud-storage URLs; a URL from such
//! an origin with the signature query stripped will fail the fetch with an
//! opaque 403 after a full round trip. Catching it up front turns that into
//! an immediate, precise diagnosis.

use shotrelay_core::AppError;

/// Hosts that serve exclusively signed content in our deployments.
const STORAGE_HOST_MARKERS: &[&str] = &["storage.googleapis.com", "amazonaws.com"];

/// Query keys any of which mark a signed URL (GCS, S3, Azure-style `sig`).
const SIGNATURE_MARKERS: &[&str] = &["x-goog-signature", "x-amz-signature", "signature", "sig"];

/// Refuse a cloud-storage URL whose signature query component is missing.
/// URLs that do not parse pass through: the fetcher reports those with a
/// more precise error than we could produce here.
pub fn ensure_signed_url_complete(raw: &str) -> Result<(), AppError> {
    let parsed = match reqwest::Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return Ok(()),
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return Ok(()),
    };

    let signed_origin = STORAGE_HOST_MARKERS
        .iter()
        .any(|marker| host == *marker || host.ends_with(&format!(".{}", marker)));
    if !signed_origin {
        return Ok(());
    }

    let has_signature = parsed.query_pairs().any(|(key, _)| {
        let key = key.to_ascii_lowercase();
        SIGNATURE_MARKERS.iter().any(|marker| key == *marker)
    });

    if has_signature {
        Ok(())
    } else {
        Err(AppError::MalformedSignedUrl(format!(
            "{} URL carries no signature query parameter",
            host
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcs_url_without_signature_is_rejected() {
        let result = ensure_signed_url_complete(
            "https://storage.googleapis.com/shots/run-42.png?GoogleAccessId=svc",
        );
        assert!(matches!(result, Err(AppError::MalformedSignedUrl(_))));
    }

    #[test]
    fn test_gcs_url_with_signature_passes() {
        assert!(ensure_signed_url_complete(
            "https://storage.googleapis.com/shots/run-42.png?X-Goog-Signature=abc123&X-Goog-Expires=600"
        )
        .is_ok());
    }

    #[test]
    fn test_s3_url_with_signature_passes() {
        assert!(ensure_signed_url_complete(
            "https://shots.s3.eu-west-1.amazonaws.com/run.png?X-Amz-Signature=deadbeef"
        )
        .is_ok());
    }

    #[test]
    fn test_s3_url_without_signature_is_rejected() {
        let result =
            ensure_signed_url_complete("https://shots.s3.eu-west-1.amazonaws.com/run.png");
        assert!(matches!(result, Err(AppError::MalformedSignedUrl(_))));
    }

    #[test]
    fn test_ordinary_host_is_not_checked() {
        assert!(ensure_signed_url_complete("https://example.com/screenshot.png").is_ok());
    }

    #[test]
    fn test_lookalike_host_suffix_is_not_matched() {
        // evil-amazonaws.com is not a subdomain of amazonaws.com
        assert!(ensure_signed_url_complete("https://evil-amazonaws.com/x.png").is_ok());
    }

    #[test]
    fn test_unparseable_url_is_left_to_the_fetcher() {
        assert!(ensure_signed_url_complete("not a url at all").is_ok());
    }
}
