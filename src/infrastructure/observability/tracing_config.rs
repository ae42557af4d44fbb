/// Log output configuration resolved once at startup.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
}

impl TracingConfig {
    /// Structured JSON output in prod, human-readable otherwise.
    /// `LOG_FORMAT=json` forces JSON regardless of environment.
    pub fn new(environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let json_format = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or_else(|_| environment.eq_ignore_ascii_case("prod"));
        Self {
            environment,
            json_format,
        }
    }
}
