//! Self-signed TLS bootstrap.
//!
//! When the configured certificate file is missing, a fresh self-signed
//! certificate is generated (CN "no-spam", SANs for localhost and
//! 127.0.0.1, one year validity) and written next to the configured paths,
//! so a first run serves TLS without any manual ceremony.
use anyhow::{Context, Result};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use std::fs;
use std::path::Path;

pub fn ensure_tls_material(cert_path: &Path, key_path: &Path) -> Result<()> {
    if cert_path.exists() {
        tracing::info!(cert = %cert_path.display(), "found existing certificate");
        return Ok(());
    }
    tracing::warn!(
        cert = %cert_path.display(),
        "certificate not found; generating self-signed certificate"
    );

    for path in [cert_path, key_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create directory {}", parent.display()))?;
            }
        }
    }

    let mut params =
        CertificateParams::new(vec!["localhost".to_string(), "127.0.0.1".to_string()])
            .context("build certificate params")?;
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, "no-spam");
    params.distinguished_name = dn;
    params.not_before = time::OffsetDateTime::now_utc();
    params.not_after = params.not_before + time::Duration::days(365);

    let key_pair = KeyPair::generate().context("generate key pair")?;
    let cert = params
        .self_signed(&key_pair)
        .context("self-sign certificate")?;

    fs::write(cert_path, cert.pem())
        .with_context(|| format!("write certificate {}", cert_path.display()))?;
    fs::write(key_path, key_pair.serialize_pem())
        .with_context(|| format!("write key {}", key_path.display()))?;
    tracing::info!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "generated self-signed certificate"
    );
    Ok(())
}
