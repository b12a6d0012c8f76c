//! Streaming compression and decompression of message bodies.
//!
//! # Responsibilities
//! - Parse comma-separated encoding lists from header values
//! - Chain every listed decompressor over a request body, in header order
//! - Pick the first acceptable compressor for a response body
//! - Surface unknown tokens as hard errors
//!
//! # Design Decisions
//! - Decompression chains all tokens (request bodies may be multiply
//!   wrapped); compression applies exactly one
//! - An omitted or empty header is identity, never an error
//! - The token list is folded iteratively; header length bounds the work

use thiserror::Error;

use crate::compression::encoding::{BoxRead, Encoding};

/// An encoding token that does not resolve to a registered encoding.
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Unsupported encoding: {0}")]
    Unsupported(String),
}

fn tokens(header: &str) -> impl Iterator<Item = &str> {
    header.split(',').map(str::trim)
}

/// Undo the encodings listed in a `Content-Encoding` header value.
///
/// Tokens apply left to right, the order the client lists them in
/// (outermost encoding first). An absent or blank header returns the
/// stream untouched; an unresolved token fails, naming that token.
pub fn decompress(stream: BoxRead, encoding: Option<&str>) -> Result<BoxRead, CompressionError> {
    let header = match encoding {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(stream),
    };

    let mut stream = stream;
    for token in tokens(header) {
        let encoding = Encoding::lookup(token)
            .ok_or_else(|| CompressionError::Unsupported(token.to_string()))?;
        stream = encoding.decoder(stream);
    }
    Ok(stream)
}

/// Apply the best-matching encoding from an `Accept-Encoding` header value.
///
/// The first token the registry resolves wins, in the client's preference
/// order. An absent or blank header selects identity; a non-empty header
/// with no resolvable token fails, naming the whole header value.
pub fn compress(
    stream: BoxRead,
    accepted: Option<&str>,
) -> Result<(Encoding, BoxRead), CompressionError> {
    let header = match accepted {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok((Encoding::Identity, stream)),
    };

    let chosen = tokens(header)
        .find_map(Encoding::lookup)
        .ok_or_else(|| CompressionError::Unsupported(header.to_string()))?;
    Ok((chosen, chosen.encoder(stream)))
}
