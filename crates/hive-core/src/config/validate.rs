//! Validation of user-supplied settings values.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::{Host, Url};

const PEM_CERT_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_CERT_END: &str = "-----END CERTIFICATE-----";

/// Check that `path` is a readable file holding at least one PEM certificate.
///
/// Returns the absolute path to store.
pub fn validate_ca_certificate(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Invalid certificate path: {}", path.display()))?;
    let content = std::fs::read(&absolute)
        .with_context(|| format!("Failed to read CA certificate: {}", absolute.display()))?;
    let text = String::from_utf8_lossy(&content);

    match text.find(PEM_CERT_BEGIN) {
        Some(start) if text[start..].contains(PEM_CERT_END) => Ok(absolute),
        _ => anyhow::bail!(
            "Invalid CA certificate: {} does not contain a PEM certificate block",
            absolute.display()
        ),
    }
}

/// Check a registry URL: http(s) only, and no private IP literal unless allowed.
pub fn validate_registry_url(raw: &str, allow_private_ip: bool) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("Invalid registry URL: {raw}"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!("Registry URL must use http or https, got '{other}'"),
    }

    let ip = match url.host() {
        Some(Host::Ipv4(ip)) => Some(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => Some(IpAddr::V6(ip)),
        Some(Host::Domain(_)) => None,
        None => anyhow::bail!("Registry URL has no host: {raw}"),
    };

    if let Some(ip) = ip
        && !allow_private_ip
        && is_private_ip(ip)
    {
        anyhow::bail!(
            "Registry URL points to private address {ip}; pass --allow-private-ip to use it"
        );
    }

    Ok(url)
}

/// Loopback, private, link-local, unspecified or IPv6 unique-local.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_v4(v4),
            None => is_private_v6(v6),
        },
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

    #[test]
    fn test_valid_certificate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ca.crt");
        std::fs::write(&path, CERT).unwrap();

        assert_eq!(validate_ca_certificate(&path).unwrap(), path);
    }

    #[test]
    fn test_certificate_without_pem_block() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ca.crt");
        std::fs::write(&path, "not a cert").unwrap();

        let err = validate_ca_certificate(&path).unwrap_err();
        assert!(err.to_string().contains("PEM certificate"));
    }

    #[test]
    fn test_missing_certificate() {
        let temp = TempDir::new().unwrap();
        assert!(validate_ca_certificate(&temp.path().join("nope.crt")).is_err());
    }

    #[test]
    fn test_registry_url_schemes() {
        assert!(validate_registry_url("https://registry.example.com/r.json", false).is_ok());
        assert!(validate_registry_url("http://registry.example.com", false).is_ok());
        assert!(validate_registry_url("ftp://registry.example.com", false).is_err());
        assert!(validate_registry_url("not a url", false).is_err());
    }

    #[test]
    fn test_private_ip_requires_opt_in() {
        for raw in [
            "http://10.0.0.5/r.json",
            "http://192.168.1.10",
            "http://127.0.0.1:8080",
            "http://169.254.1.1",
            "http://[::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(validate_registry_url(raw, false).is_err(), "{raw}");
            assert!(validate_registry_url(raw, true).is_ok(), "{raw}");
        }
        assert!(validate_registry_url("http://8.8.8.8", false).is_ok());
    }

    #[test]
    fn test_hostnames_are_not_resolved() {
        assert!(validate_registry_url("http://localhost:5000", false).is_ok());
    }
}
