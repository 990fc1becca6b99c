//! HTTP `Range: bytes=` resolution against a known resource size.

use thiserror::Error;

/// Inclusive byte range satisfying `start <= end < total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a partial response
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }

    /// `Content-Range` value for a 416 response
    pub fn unsatisfied_content_range(total: u64) -> String {
        format!("bytes */{}", total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Malformed range header: {0}")]
    Malformed(String),

    #[error("Range not satisfiable for resource of {total} bytes")]
    Unsatisfiable { total: u64 },
}

/// Resolve a `Range` header value.
///
/// Returns `Ok(None)` when the header does not use the `bytes` unit, in which
/// case the full resource is served. Only the single `bytes=<start>-<end?>`
/// form is understood. The lower bound is never adjusted; the upper bound is
/// clamped to the last byte and then to `max_chunk` bytes from `start`.
/// Positions too large for `u64` count as past the end of the resource.
pub fn parse_range_header(
    header: &str,
    total: u64,
    max_chunk: u64,
) -> Result<Option<ByteRange>, RangeError> {
    let header = header.trim();
    let Some(spec) = header.strip_prefix("bytes=") else {
        return Ok(None);
    };

    let (start_str, end_str) = spec
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed(header.to_string()))?;

    if start_str.is_empty() || !start_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(header.to_string()));
    }
    if !end_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(header.to_string()));
    }

    // Digits only at this point, so a parse failure is an overflow.
    let start = start_str.parse::<u64>().unwrap_or(u64::MAX);
    let requested_end = (!end_str.is_empty()).then(|| end_str.parse::<u64>().unwrap_or(u64::MAX));

    if start >= total {
        return Err(RangeError::Unsatisfiable { total });
    }

    let last = total - 1;
    let end = match requested_end {
        Some(end) if end < start => return Err(RangeError::Unsatisfiable { total }),
        Some(end) => end.min(last),
        None => last,
    };

    let max_chunk = max_chunk.max(1);
    let end = if end - start + 1 > max_chunk {
        start.saturating_add(max_chunk - 1).min(last)
    } else {
        end
    };

    Ok(Some(ByteRange { start, end }))
}
