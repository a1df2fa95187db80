pub mod domain;
pub mod extract;
pub mod llm;
pub mod storage;

pub mod config {
    use anyhow::Context;

    /// Placeholder value shipped in sample env files; treated as "not configured".
    pub const PLACEHOLDER_OPENAI_API_KEY: &str = "your-openai-api-key-here";

    const DEFAULT_SHARE_LINK_TTL_DAYS: i64 = 30;
    pub const MAX_SHARE_LINK_TTL_DAYS: i64 = 3650;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub openai_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub share_link_ttl_days: i64,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let share_link_ttl_days =
                parse_share_link_ttl(std::env::var("SHARE_LINK_TTL_DAYS").ok().as_deref())?;

            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                share_link_ttl_days,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        /// The extraction credential, ignoring blank and placeholder values.
        pub fn extraction_credential(&self) -> Option<&str> {
            self.openai_api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty() && *k != PLACEHOLDER_OPENAI_API_KEY)
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.extraction_credential()
                .context("OPENAI_API_KEY is required")
        }
    }

    fn parse_share_link_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
        let Some(s) = raw else {
            return Ok(DEFAULT_SHARE_LINK_TTL_DAYS);
        };
        let days = s
            .trim()
            .parse::<i64>()
            .with_context(|| format!("SHARE_LINK_TTL_DAYS must be an integer (got {s:?})"))?;
        anyhow::ensure!(
            (1..=MAX_SHARE_LINK_TTL_DAYS).contains(&days),
            "SHARE_LINK_TTL_DAYS must be between 1 and {MAX_SHARE_LINK_TTL_DAYS} (got {days})"
        );
        Ok(days)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn settings_with_key(key: Option<&str>) -> Settings {
            Settings {
                database_url: None,
                openai_api_key: key.map(str::to_string),
                sentry_dsn: None,
                share_link_ttl_days: DEFAULT_SHARE_LINK_TTL_DAYS,
            }
        }

        #[test]
        fn placeholder_and_blank_keys_are_not_credentials() {
            assert!(settings_with_key(None).extraction_credential().is_none());
            assert!(settings_with_key(Some("  ")).extraction_credential().is_none());
            assert!(settings_with_key(Some(PLACEHOLDER_OPENAI_API_KEY))
                .extraction_credential()
                .is_none());
            assert_eq!(
                settings_with_key(Some(" sk-test ")).extraction_credential(),
                Some("sk-test")
            );
        }

        #[test]
        fn share_link_ttl_is_bounded() {
            assert_eq!(parse_share_link_ttl(None).unwrap(), DEFAULT_SHARE_LINK_TTL_DAYS);
            assert_eq!(parse_share_link_ttl(Some(" 7 ")).unwrap(), 7);
            assert_eq!(
                parse_share_link_ttl(Some("3650")).unwrap(),
                MAX_SHARE_LINK_TTL_DAYS
            );
            for bad in ["0", "-1", "3651", "9223372036854775807", "thirty"] {
                assert!(parse_share_link_ttl(Some(bad)).is_err(), "{bad}");
            }
        }
    }
}
