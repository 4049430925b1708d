use std::path::Path;

use rand::Rng;
use tracing::warn;

use crate::error::ConfigError;
use crate::game::Player;

/// Which side the human plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HumanSide {
    /// Human opens as X
    A,
    /// Human replies as O
    B,
    /// Toss a coin
    Random,
    /// Computer plays both sides
    None,
}

impl HumanSide {
    /// Settle on the human's player, if any.
    pub fn resolve<R: Rng>(self, rng: &mut R) -> Option<Player> {
        match self {
            HumanSide::A => Some(Player::A),
            HumanSide::B => Some(Player::B),
            HumanSide::Random => Some(if rng.random_bool(0.5) {
                Player::A
            } else {
                Player::B
            }),
            HumanSide::None => None,
        }
    }
}

/// Kind of automated opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OpponentKind {
    Random,
    Policy,
}

/// Seat assignment and randomness.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub human_side: HumanSide,
    pub opponent: OpponentKind,
    /// Seed for every random stream in a game; unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            human_side: HumanSide::Random,
            opponent: OpponentKind::Random,
            seed: None,
        }
    }
}

/// External policy endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub max_tokens: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_ms: 10_000,
            max_tokens: 8,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "policy.timeout_ms must be > 0".into(),
            ));
        }
        if self.policy.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "policy.max_tokens must be > 0".into(),
            ));
        }
        if self.policy.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "policy.model must not be empty".into(),
            ));
        }
        if self.policy.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "policy.endpoint must not be empty".into(),
            ));
        }
        if self.policy.api_key_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "policy.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Render as TOML, in the same shape [`AppConfig::load`] reads.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[game]
human_side = "b"
opponent = "policy"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.human_side, HumanSide::B);
        assert_eq!(config.game.opponent, OpponentKind::Policy);
        assert_eq!(config.game.seed, None);
        assert_eq!(config.policy, PolicyConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.policy.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let mut config = AppConfig::default();
        config.policy.model = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connect_four.toml");
        std::fs::write(
            &path,
            r#"
[game]
seed = 42

[policy]
model = "gpt-4o-mini"
timeout_ms = 2500
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.game.seed, Some(42));
        assert_eq!(config.policy.model, "gpt-4o-mini");
        assert_eq!(config.policy.timeout_ms, 2500);
        assert_eq!(config.policy.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[policy]\nmax_tokens = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_to_toml_roundtrips() {
        let toml_str = AppConfig::default().to_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_to_toml_keeps_overrides() {
        let mut config = AppConfig::default();
        config.game.seed = Some(99);
        config.game.opponent = OpponentKind::Policy;
        config.policy.timeout_ms = 1500;

        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("seed = 99"));
        assert!(toml_str.contains(r#"opponent = "policy""#));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effective.toml");
        std::fs::write(&path, &toml_str).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_human_side_resolve() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(HumanSide::A.resolve(&mut rng), Some(Player::A));
        assert_eq!(HumanSide::B.resolve(&mut rng), Some(Player::B));
        assert_eq!(HumanSide::None.resolve(&mut rng), None);
        assert!(HumanSide::Random.resolve(&mut rng).is_some());
    }
}
