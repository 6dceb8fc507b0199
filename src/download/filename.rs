//! Filename resolution for downloads.
//!
//! Precedence: explicit request filename, then the response's
//! Content-Disposition header, then the last URL path segment.

use url::Url;

/// Resolves the filename to save the download under.
///
/// Precedence:
/// 1. Explicit filename from the request, used unchanged
/// 2. `filename` token from the Content-Disposition header
/// 3. Last path segment of the URL, trimmed of whitespace
///
/// Always returns a non-empty string: a URL whose path ends in `/` falls
/// back to a timestamped name.
#[must_use]
pub fn resolve_filename(
    explicit: Option<&str>,
    content_disposition: Option<&str>,
    url: &Url,
) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }

    if let Some(header) = content_disposition
        && let Some(name) = parse_content_disposition(header)
    {
        return name;
    }

    filename_from_url(url)
}

/// Parses a Content-Disposition header to extract the filename.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    // filename*= takes precedence per RFC 6266
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim();
            if let Ok(decoded) = urlencoding::decode(encoded_name)
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + 9..].trim();
        let name = if let Some(stripped) = value.strip_prefix('"') {
            stripped[..stripped.find('"')?].to_string()
        } else {
            let end = value.find(';').unwrap_or(value.len());
            value[..end].trim().trim_matches('\'').to_string()
        };
        if !name.is_empty() {
            return Some(name);
        }
    }

    None
}

/// Derives a filename from the last URL path segment.
///
/// URL-decodes percent escapes and trims whitespace. A final segment that is
/// empty or whitespace after decoding (path ending in `/`, or e.g. `%20`)
/// yields `download_<unix-secs>.bin` so the resolver's non-empty guarantee
/// holds.
pub(crate) fn filename_from_url(url: &Url) -> String {
    if let Some(mut segments) = url.path_segments()
        && let Some(last) = segments.next_back()
    {
        // The emptiness check must run on the decoded form: a segment like
        // "%20" is non-empty as written but decodes to pure whitespace.
        let decoded = urlencoding::decode(last).unwrap_or_else(|_| last.into());
        let trimmed = decoded.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("download_{timestamp}.bin")
}
