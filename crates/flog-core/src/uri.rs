//! The absolute-URI grammar the client engine parses to pick a transport
//! and default port:
//!
//! ```text
//! scheme ::= "http" | "https" | "oncrpc" | "oncrpcs" | "oncrpcu"
//! URI    ::= scheme "://" host [":" port] resource
//! ```
//!
//! Suffix `s` selects TLS, suffix `u` selects UDP, otherwise plain TCP.

use crate::error::{CoreError, ErrorCategory, codes};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportKind {
    Tcp,
    Tls,
    Udp,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Uri {
    scheme: String,
    host: String,
    port: u16,
    resource: String,
}

impl Uri {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let (scheme, rest) = raw.split_once("://").ok_or_else(|| malformed(raw))?;
        if scheme.is_empty() {
            return Err(malformed(raw));
        }
        let (authority, resource) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };
        if authority.is_empty() {
            return Err(malformed(raw));
        }
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port_str)) if !host.is_empty() => {
                let port: u16 = port_str.parse().map_err(|_| malformed(raw))?;
                (host.to_string(), port)
            }
            _ => (authority.to_string(), default_port(scheme)),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            host,
            port,
            resource: resource.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Picks the transport implied by the scheme's suffix:
    /// `s` → TLS, `u` → UDP, otherwise plain TCP.
    pub fn transport_kind(&self) -> TransportKind {
        if self.scheme.ends_with('s') {
            TransportKind::Tls
        } else if self.scheme.ends_with('u') {
            TransportKind::Udp
        } else {
            TransportKind::Tcp
        }
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" | "oncrpcs" => 443,
        "http" => 80,
        _ => 80,
    }
}

fn malformed(raw: &str) -> CoreError {
    CoreError::new(
        codes::HTTP_MALFORMED,
        ErrorCategory::Malformed,
        format!("not a valid absolute URI: {raw}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_and_resource() {
        let uri = Uri::parse("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(uri.scheme(), "http");
        assert_eq!(uri.host(), "127.0.0.1");
        assert_eq!(uri.port(), 8080);
        assert_eq!(uri.resource(), "/x");
        assert_eq!(uri.transport_kind(), TransportKind::Tcp);
    }

    #[test]
    fn defaults_http_port_to_80_and_resource_to_slash() {
        let uri = Uri::parse("http://example.com").unwrap();
        assert_eq!(uri.port(), 80);
        assert_eq!(uri.resource(), "/");
    }

    #[test]
    fn https_suffix_selects_tls_transport() {
        let uri = Uri::parse("https://example.com/").unwrap();
        assert_eq!(uri.transport_kind(), TransportKind::Tls);
    }

    #[test]
    fn oncrpcu_suffix_selects_udp_transport() {
        let uri = Uri::parse("oncrpcu://127.0.0.1:1234/").unwrap();
        assert_eq!(uri.transport_kind(), TransportKind::Udp);
    }

    #[test]
    fn oncrpcs_suffix_selects_tls_transport() {
        let uri = Uri::parse("oncrpcs://127.0.0.1:1234/").unwrap();
        assert_eq!(uri.transport_kind(), TransportKind::Tls);
    }

    #[test]
    fn missing_scheme_separator_is_rejected() {
        assert!(Uri::parse("not-a-uri").is_err());
    }
}
