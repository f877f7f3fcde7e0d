use std::{env, time::Duration};

pub const LOCAL_API_URL: &str = "http://localhost:4000";

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the API, without a trailing slash.
    pub base_url: String,
    /// Skip availability checks and always talk to the backend.
    pub force_backend: bool,
    pub health_timeout: Duration,
    /// How long a health answer is trusted before the next call re-probes.
    pub availability_ttl: Duration,
    /// Applies to CRUD requests. `None` waits for as long as the server takes.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            force_backend: false,
            health_timeout: Duration::from_secs(3),
            availability_ttl: Duration::from_secs(30),
            request_timeout: None,
        }
    }

    /// Resolves the API location from `SAGIP_API_URL` (compile time, then run
    /// time), falling back to the page host in `SAGIP_PAGE_HOST`.
    pub fn from_env() -> Self {
        Self::from_lookup(option_env!("SAGIP_API_URL"), |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        build_time_url: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let base_url = build_time_url
            .map(str::to_string)
            .or_else(|| lookup("SAGIP_API_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| resolve_base_url(lookup("SAGIP_PAGE_HOST").as_deref()));

        let force_backend = lookup("SAGIP_FORCE_BACKEND")
            .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        log::info!("Using API at {base_url}");
        Self::new(base_url).with_force_backend(force_backend)
    }

    pub fn with_force_backend(mut self, force_backend: bool) -> Self {
        self.force_backend = force_backend;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn with_availability_ttl(mut self, ttl: Duration) -> Self {
        self.availability_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Local pages talk to the development server, anything else to its own origin.
pub fn resolve_base_url(page_host: Option<&str>) -> String {
    match page_host.map(str::trim).filter(|host| !host.is_empty()) {
        None => LOCAL_API_URL.to_string(),
        Some(host) => {
            let hostname = hostname(host);
            if LOCAL_HOSTS.contains(&hostname) {
                LOCAL_API_URL.to_string()
            } else {
                format!("https://{host}")
            }
        }
    }
}

/// Strips a port, and the brackets around an IPv6 literal.
fn hostname(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    if host.matches(':').count() > 1 {
        return host;
    }
    host.split(':').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_local_hosts_use_the_development_server() {
        let hosts = [
            None,
            Some("localhost"),
            Some("localhost:5173"),
            Some("127.0.0.1"),
            Some("[::1]:8080"),
            Some("::1"),
        ];
        for host in hosts {
            assert_eq!(resolve_base_url(host), LOCAL_API_URL, "{host:?}");
        }
    }

    #[test]
    fn test_remote_hosts_use_same_origin() {
        assert_eq!(resolve_base_url(Some("sagip.ph")), "https://sagip.ph");
        assert_eq!(
            resolve_base_url(Some("app.sagip.ph:8443")),
            "https://app.sagip.ph:8443"
        );
    }

    #[test]
    fn test_build_time_url_wins() {
        let config = ClientConfig::from_lookup(
            Some("https://build.example/"),
            lookup(&[("SAGIP_API_URL", "https://runtime.example")]),
        );
        assert_eq!(config.base_url, "https://build.example");
    }

    #[test]
    fn test_runtime_url_then_page_host() {
        let config = ClientConfig::from_lookup(
            None,
            lookup(&[("SAGIP_API_URL", "https://runtime.example")]),
        );
        assert_eq!(config.base_url, "https://runtime.example");

        let config = ClientConfig::from_lookup(None, lookup(&[("SAGIP_PAGE_HOST", "sagip.ph")]));
        assert_eq!(config.base_url, "https://sagip.ph");
    }

    #[test]
    fn test_force_backend_flag() {
        let config = ClientConfig::from_lookup(None, lookup(&[("SAGIP_FORCE_BACKEND", "Yes")]));
        assert!(config.force_backend);

        let config = ClientConfig::from_lookup(None, lookup(&[("SAGIP_FORCE_BACKEND", "0")]));
        assert!(!config.force_backend);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new(LOCAL_API_URL);
        assert_eq!(config.health_timeout, Duration::from_secs(3));
        assert_eq!(config.availability_ttl, Duration::from_secs(30));
        assert_eq!(config.request_timeout, None);
    }
}
