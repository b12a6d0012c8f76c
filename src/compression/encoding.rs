//! Registered content encodings and their codec constructors.

use async_compression::tokio::bufread::{
    BrotliDecoder, BrotliEncoder, GzipDecoder, GzipEncoder, ZlibDecoder, ZlibEncoder,
};
use std::pin::Pin;
use tokio::io::{AsyncRead, BufReader};

/// A boxed byte stream flowing through the gateway.
pub type BoxRead = Pin<Box<dyn AsyncRead + Send>>;

/// A content encoding the gateway can apply or undo.
///
/// `Deflate` is the zlib-wrapped format, matching what clients send under
/// `Content-Encoding: deflate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Deflate,
    Brotli,
    Identity,
}

impl Encoding {
    /// Resolve a header token to a registered encoding.
    ///
    /// Tokens are case-sensitive. `brotli` is accepted as a historical
    /// alias for `br`.
    pub fn lookup(token: &str) -> Option<Encoding> {
        match token {
            "gzip" => Some(Encoding::Gzip),
            "deflate" => Some(Encoding::Deflate),
            "br" | "brotli" => Some(Encoding::Brotli),
            "identity" => Some(Encoding::Identity),
            _ => None,
        }
    }

    /// Canonical token, as written into `Content-Encoding`.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
            Encoding::Brotli => "br",
            Encoding::Identity => "identity",
        }
    }

    /// Wrap a stream in this encoding's decompressor.
    pub fn decoder(&self, stream: BoxRead) -> BoxRead {
        match self {
            Encoding::Gzip => Box::pin(GzipDecoder::new(BufReader::new(stream))),
            Encoding::Deflate => Box::pin(ZlibDecoder::new(BufReader::new(stream))),
            Encoding::Brotli => Box::pin(BrotliDecoder::new(BufReader::new(stream))),
            Encoding::Identity => stream,
        }
    }

    /// Wrap a stream in this encoding's compressor.
    pub fn encoder(&self, stream: BoxRead) -> BoxRead {
        match self {
            Encoding::Gzip => Box::pin(GzipEncoder::new(BufReader::new(stream))),
            Encoding::Deflate => Box::pin(ZlibEncoder::new(BufReader::new(stream))),
            Encoding::Brotli => Box::pin(BrotliEncoder::new(BufReader::new(stream))),
            Encoding::Identity => stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_registered_tokens() {
        assert_eq!(Encoding::lookup("gzip"), Some(Encoding::Gzip));
        assert_eq!(Encoding::lookup("deflate"), Some(Encoding::Deflate));
        assert_eq!(Encoding::lookup("br"), Some(Encoding::Brotli));
        assert_eq!(Encoding::lookup("brotli"), Some(Encoding::Brotli));
        assert_eq!(Encoding::lookup("identity"), Some(Encoding::Identity));
    }

    #[test]
    fn rejects_unknown_and_case_variant_tokens() {
        assert_eq!(Encoding::lookup("zstd"), None);
        assert_eq!(Encoding::lookup("GZIP"), None);
        assert_eq!(Encoding::lookup(""), None);
    }

    #[test]
    fn alias_reports_canonical_name() {
        let encoding = Encoding::lookup("brotli").unwrap();
        assert_eq!(encoding.name(), "br");
    }
}
