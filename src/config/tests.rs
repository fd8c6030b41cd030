#[cfg(test)]
mod tests {
    use crate::config::ProxyConfig;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProxyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.local_port, 3000);
        assert_eq!(config.upstream_host, "www.public.asu.edu");
        assert_eq!(config.upstream_port, 80);
        assert_eq!(config.max_requests, 15);
        assert_eq!(config.capacity_bytes(), 1024 * 1024);
        assert_eq!(config.freshness_secs, 10);
    }

    #[test]
    fn test_rejects_empty_upstream_host() {
        let config = ProxyConfig {
            upstream_host: String::new(),
            ..ProxyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unsupported_method() {
        let config = ProxyConfig {
            method: "PATCH".to_string(),
            ..ProxyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_quota_and_capacity() {
        let config = ProxyConfig {
            max_requests: 0,
            ..ProxyConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ProxyConfig {
            cache_size_kb: 0,
            ..ProxyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_file_shape() {
        let config: ProxyConfig = serde_json::from_str(
            r#"{
                "local_port": 3001,
                "upstream_host": "example.com",
                "upstream_port": 8080,
                "max_requests": 5,
                "cache_size_kb": 64,
                "freshness_secs": 30
            }"#,
        )
        .unwrap();
        assert_eq!(config.local_port, 3001);
        assert_eq!(config.upstream_host, "example.com");
        assert_eq!(config.max_requests, 5);
        // Omitted fields fall back to the defaults.
        assert_eq!(config.method, "GET");
        assert_eq!(config.upstream_timeout_secs, 30);
    }

    #[test]
    fn test_unknown_json_field_rejected() {
        let result: Result<ProxyConfig, _> = serde_json::from_str(r#"{"bogus": 1}"#);
        assert!(result.is_err());
    }
}
