use std::fmt;

/// Subdomain labels that belong to the platform itself and never name a tenant.
pub const RESERVED_SUBDOMAINS: [&str; 5] = ["www", "app", "api", "admin", "staging"];

/// TenantSlug
///
/// A candidate board slug taken from the request host. It has not been checked against the
/// board table; an unknown slug surfaces later as a not-found board page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantSlug(String);

impl TenantSlug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// is_reserved_subdomain
///
/// True for labels such as `www` or `api` that route to the apex site.
pub fn is_reserved_subdomain(label: &str) -> bool {
    RESERVED_SUBDOMAINS.contains(&label)
}

/// resolve_tenant
///
/// Derives the tenant addressed by a `Host` header.
///
/// Returns `None` for the apex domain, for hosts outside `root_domain`, for reserved labels, for a
/// missing or empty host and for a candidate that is not made of DNS labels (`[a-z0-9-]`, dot
/// separated). Otherwise everything left of `.{root_domain}` is the candidate slug, used verbatim
/// (no multi-level subdomain handling).
///
/// The comparison is case-insensitive. A `:port` suffix on the host is ignored unless the configured
/// root domain carries a port itself.
pub fn resolve_tenant(host: Option<&str>, root_domain: &str) -> Option<TenantSlug> {
    let host = host?.trim().to_ascii_lowercase();
    let root = root_domain.trim().to_ascii_lowercase();
    if host.is_empty() || root.is_empty() {
        return None;
    }

    let host = if root.contains(':') {
        host.as_str()
    } else {
        strip_port(&host)
    };

    let candidate = host.strip_suffix(root.as_str())?.strip_suffix('.')?;
    if !is_dns_name(candidate) || is_reserved_subdomain(candidate) {
        return None;
    }

    Some(TenantSlug(candidate.to_string()))
}

/// The candidate becomes a path segment; anything outside `[a-z0-9-]` labels (`/`, `?`, `#`, `%`,
/// empty labels) would change the internal route.
fn is_dns_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.split('.').all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        })
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
