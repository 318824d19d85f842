//! Extractor configuration.

use llm_client::RetrySchedule;

use crate::error::ConfigError;

/// Configuration for the orchestration core.
///
/// Backend credentials live on the `LlmClient`s, not here; this covers the
/// orchestration knobs only.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Model dispatched by the fast primary backend.
    pub primary_model: String,

    /// Model dispatched by the slower fallback backend.
    pub secondary_model: String,

    /// Escalating per-attempt timeout budgets in milliseconds.
    pub timeout_schedule_ms: Vec<u64>,

    /// Largest accepted raw capture, in KB. Larger pages are rejected
    /// before preprocessing.
    pub max_html_kb: usize,

    /// Largest accepted post-preprocessing token estimate. An oversized
    /// prompt is a guaranteed backend failure, not worth the round-trip.
    pub max_estimated_tokens: usize,

    /// Minimum spacing between backend dispatches, process-wide.
    pub min_dispatch_spacing_ms: u64,

    /// Whether a transient primary failure races a primary retry against
    /// the secondary backend.
    pub race_fallback_enabled: bool,

    /// Output-token cap passed to backends.
    pub max_output_tokens: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            primary_model: "gpt-4o-mini".to_string(),
            secondary_model: "gpt-4o".to_string(),
            timeout_schedule_ms: vec![45_000, 90_000],
            max_html_kb: 1_024,
            max_estimated_tokens: 110_000,
            min_dispatch_spacing_ms: 500,
            race_fallback_enabled: true,
            max_output_tokens: 8_192,
        }
    }
}

impl ExtractorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `EXTRACTOR_*` environment variables. Unset
    /// variables keep their defaults; set-but-invalid values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = read_var("EXTRACTOR_PRIMARY_MODEL") {
            config.primary_model = model;
        }
        if let Some(model) = read_var("EXTRACTOR_SECONDARY_MODEL") {
            config.secondary_model = model;
        }
        if let Some(raw) = read_var("EXTRACTOR_TIMEOUT_SCHEDULE_MS") {
            config.timeout_schedule_ms = parse_schedule("EXTRACTOR_TIMEOUT_SCHEDULE_MS", &raw)?;
        }
        if let Some(raw) = read_var("EXTRACTOR_MAX_HTML_KB") {
            config.max_html_kb = parse_number("EXTRACTOR_MAX_HTML_KB", &raw)?;
        }
        if let Some(raw) = read_var("EXTRACTOR_MAX_ESTIMATED_TOKENS") {
            config.max_estimated_tokens = parse_number("EXTRACTOR_MAX_ESTIMATED_TOKENS", &raw)?;
        }
        if let Some(raw) = read_var("EXTRACTOR_MIN_SPACING_MS") {
            config.min_dispatch_spacing_ms = parse_number("EXTRACTOR_MIN_SPACING_MS", &raw)?;
        }
        if let Some(raw) = read_var("EXTRACTOR_RACE_FALLBACK") {
            config.race_fallback_enabled = match raw.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "EXTRACTOR_RACE_FALLBACK".into(),
                        value: raw,
                    })
                }
            };
        }
        if let Some(raw) = read_var("EXTRACTOR_MAX_OUTPUT_TOKENS") {
            config.max_output_tokens = parse_number("EXTRACTOR_MAX_OUTPUT_TOKENS", &raw)?;
        }

        Ok(config)
    }

    /// Set the primary model.
    pub fn with_primary_model(mut self, model: impl Into<String>) -> Self {
        self.primary_model = model.into();
        self
    }

    /// Set the secondary model.
    pub fn with_secondary_model(mut self, model: impl Into<String>) -> Self {
        self.secondary_model = model.into();
        self
    }

    /// Set the timeout schedule in milliseconds.
    pub fn with_timeout_schedule_ms(mut self, schedule: Vec<u64>) -> Self {
        self.timeout_schedule_ms = schedule;
        self
    }

    /// Set the max accepted HTML size in KB.
    pub fn with_max_html_kb(mut self, kb: usize) -> Self {
        self.max_html_kb = kb;
        self
    }

    /// Set the max accepted token estimate.
    pub fn with_max_estimated_tokens(mut self, tokens: usize) -> Self {
        self.max_estimated_tokens = tokens;
        self
    }

    /// Set the minimum dispatch spacing in milliseconds.
    pub fn with_min_spacing_ms(mut self, ms: u64) -> Self {
        self.min_dispatch_spacing_ms = ms;
        self
    }

    /// Enable or disable the race fallback.
    pub fn with_race_fallback(mut self, enabled: bool) -> Self {
        self.race_fallback_enabled = enabled;
        self
    }

    /// The retry schedule derived from the timeout budgets.
    pub fn schedule(&self) -> RetrySchedule {
        RetrySchedule::from_millis(&self.timeout_schedule_ms)
    }

    /// Byte form of the HTML ceiling.
    pub fn max_html_bytes(&self) -> usize {
        self.max_html_kb * 1024
    }
}

fn read_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.into(),
        value: raw.into(),
    })
}

fn parse_schedule(var: &str, raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .map(|part| parse_number(var, part))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = ExtractorConfig::default();
        assert_eq!(config.timeout_schedule_ms, vec![45_000, 90_000]);
        assert!(config.race_fallback_enabled);
        assert_eq!(config.max_html_bytes(), 1_024 * 1024);
        assert_eq!(config.schedule().attempts(), 2);
    }

    #[test]
    fn test_builder() {
        let config = ExtractorConfig::new()
            .with_primary_model("fast")
            .with_secondary_model("thorough")
            .with_timeout_schedule_ms(vec![100, 200, 400])
            .with_max_html_kb(256)
            .with_race_fallback(false);

        assert_eq!(config.primary_model, "fast");
        assert_eq!(config.schedule().attempts(), 3);
        assert_eq!(config.max_html_bytes(), 256 * 1024);
        assert!(!config.race_fallback_enabled);
    }

    #[test]
    fn test_parse_schedule() {
        assert_eq!(
            parse_schedule("X", "45000,90000").unwrap(),
            vec![45_000, 90_000]
        );
        assert_eq!(parse_schedule("X", " 100 , 200 ").unwrap(), vec![100, 200]);
        assert!(parse_schedule("X", "100,fast").is_err());
    }
}
