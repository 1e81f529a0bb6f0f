//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tab_core::{DistributionOptions, DistributionType, UserId};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Symbol printed before amounts.
    pub currency_symbol: String,

    /// The user acting when `--user` is not given.
    pub user_id: Option<UserId>,

    /// Default tax distribution when `--tax` is not given.
    pub tax_distribution: DistributionType,

    /// Default tip distribution when `--tip` is not given.
    pub tip_distribution: DistributionType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "£".to_string(),
            user_id: None,
            tax_distribution: DistributionType::Proportional,
            tip_distribution: DistributionType::Proportional,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TAB_*)
        figment = figment.merge(Env::prefixed("TAB_"));

        figment.extract()
    }

    /// Distribution options, with explicit flags taking precedence.
    pub fn distribution(
        &self,
        tax: Option<DistributionType>,
        tip: Option<DistributionType>,
    ) -> DistributionOptions {
        DistributionOptions::new(
            tax.unwrap_or(self.tax_distribution),
            tip.unwrap_or(self.tip_distribution),
        )
    }
}

/// Returns the platform-specific config directory for tab.
///
/// On Linux: `~/.config/tab`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tab"))
}
