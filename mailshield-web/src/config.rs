use std::path::PathBuf;

use clap::Parser;
use mailshield_core::AlgorithmMode;

/// Used when `API_SECRET` is not set. Startup logs a warning.
pub const DEFAULT_API_SECRET: &str = "change-me-insecure-default";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Masks PII in email text and classifies it over HTTP", long_about = None)]
pub struct Config {
    #[arg(long, env = "MAILSHIELD_HOST", default_value = "0.0.0.0", help = "Address to bind")]
    pub host: String,

    #[arg(long, env = "MAILSHIELD_PORT", default_value_t = 8000, help = "Port to bind")]
    pub port: u16,

    #[arg(
        long,
        env = "MODEL_PATH",
        default_value = "models/email_classifier.json",
        help = "Trained classifier artifact"
    )]
    pub model_path: PathBuf,

    #[arg(long, env = "NER_WEIGHTS_PATH", help = "JSON file with CRF weights replacing the built-in ones")]
    pub ner_weights: Option<PathBuf>,

    #[arg(
        long,
        env = "NER_MODE",
        default_value = "hybrid",
        help = "Entity recognizer mode (hybrid, rules_only, crf_only)"
    )]
    pub ner_mode: AlgorithmMode,

    #[arg(
        long,
        env = "API_SECRET",
        default_value = DEFAULT_API_SECRET,
        hide_env_values = true,
        help = "Bearer token required by POST /classify"
    )]
    pub api_secret: String,

    #[arg(long, default_value = "info", help = "Log level when RUST_LOG is unset (error, warn, info, debug, trace)")]
    pub log_level: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.api_secret == DEFAULT_API_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["mailshield-web"]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.ner_mode, AlgorithmMode::Hybrid);
        assert_eq!(config.model_path, PathBuf::from("models/email_classifier.json"));
        assert!(config.ner_weights.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "mailshield-web",
            "--port",
            "9100",
            "--ner-mode",
            "rules_only",
            "--api-secret",
            "s3cret",
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), format!("{}:9100", config.host));
        assert_eq!(config.ner_mode, AlgorithmMode::RulesOnly);
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Config::try_parse_from(["mailshield-web", "--ner-mode", "neural"]).is_err());
    }
}
