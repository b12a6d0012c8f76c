//! Smart-HTTP service negotiation.
//!
//! # Responsibilities
//! - Classify a raw request path into a Git service invocation
//! - Reject paths that are not valid protocol shapes
//! - Provide the command line, content type and pkt-line advertisement
//!   prelude for the chosen service
//!
//! Negotiation validates protocol shape only; repository existence is the
//! adapter's concern.

use bytes::Bytes;
use thiserror::Error;

/// The two services spoken over the smart transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    UploadPack,
    ReceivePack,
}

impl ServiceKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "git-upload-pack" => Some(ServiceKind::UploadPack),
            "git-receive-pack" => Some(ServiceKind::ReceivePack),
            _ => None,
        }
    }

    /// Executable implementing this service.
    pub fn command(&self) -> &'static str {
        match self {
            ServiceKind::UploadPack => "git-upload-pack",
            ServiceKind::ReceivePack => "git-receive-pack",
        }
    }
}

/// A request shape the negotiator refuses.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("service parameter required")]
    ServiceRequired,

    #[error("unsupported service: {0}")]
    UnsupportedService(String),
}

/// A negotiated service invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitService {
    kind: ServiceKind,
    advertise: bool,
}

impl GitService {
    /// Short label for logging: `info`, `pull` or `push`.
    pub fn action(&self) -> &'static str {
        if self.advertise {
            "info"
        } else {
            match self.kind {
                ServiceKind::UploadPack => "pull",
                ServiceKind::ReceivePack => "push",
            }
        }
    }

    pub fn command(&self) -> &'static str {
        self.kind.command()
    }

    /// Arguments preceding the repository directory.
    pub fn args(&self) -> &'static [&'static str] {
        if self.advertise {
            &["--stateless-rpc", "--advertise-refs"]
        } else {
            &["--stateless-rpc"]
        }
    }

    pub fn content_type(&self) -> String {
        if self.advertise {
            format!("application/x-{}-advertisement", self.command())
        } else {
            format!("application/x-{}-result", self.command())
        }
    }

    /// The `# service=` pkt-line and flush that open an advertisement
    /// body, before the process output. Empty for stateless-RPC calls.
    pub fn advertisement_prelude(&self) -> Option<Bytes> {
        if !self.advertise {
            return None;
        }
        let line = format!("# service={}\n", self.command());
        let mut prelude = format!("{:04x}", line.len() + 4).into_bytes();
        prelude.extend_from_slice(line.as_bytes());
        prelude.extend_from_slice(b"0000");
        Some(Bytes::from(prelude))
    }
}

/// Classify a raw request path (with query string) into a [`GitService`].
pub fn negotiate(path: &str) -> Result<GitService, NegotiationError> {
    let (path_only, query) = match path.split_once('?') {
        Some((path_only, query)) => (path_only, Some(query)),
        None => (path, None),
    };

    if path_only.ends_with("/info/refs") {
        let service = query
            .and_then(service_param)
            .ok_or(NegotiationError::ServiceRequired)?;
        let kind = ServiceKind::from_token(&service)
            .ok_or(NegotiationError::UnsupportedService(service))?;
        return Ok(GitService {
            kind,
            advertise: true,
        });
    }

    let last_segment = path_only.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    if let Some(kind) = ServiceKind::from_token(last_segment) {
        return Ok(GitService {
            kind,
            advertise: false,
        });
    }

    // Dumb-transport paths still negotiate, as an upload-pack
    // advertisement, so repository resolution runs for them too.
    if last_segment == "HEAD" || path_only.contains("/objects/") {
        return Ok(GitService {
            kind: ServiceKind::UploadPack,
            advertise: true,
        });
    }

    Err(NegotiationError::UnsupportedService(last_segment.to_string()))
}

fn service_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "service")
        .map(|(_, value)| value.into_owned())
}
