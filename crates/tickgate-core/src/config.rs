use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Symbol;
use crate::ConfigError;

/// CAC 40 constituents tracked when no ticker list is configured.
pub const CAC40_TICKERS: [&str; 40] = [
    "AI.PA", "AIR.PA", "ALO.PA", "MT.AS", "CS.PA", "BNP.PA", "EN.PA", "CAP.PA", "CA.PA", "ACA.PA",
    "BN.PA", "DSY.PA", "EDEN.PA", "ENGI.PA", "EL.PA", "ERF.PA", "RMS.PA", "KER.PA", "OR.PA",
    "LR.PA", "MC.PA", "ML.PA", "ORA.PA", "RI.PA", "PUB.PA", "RNO.PA", "SAF.PA", "SGO.PA",
    "SAN.PA", "SU.PA", "GLE.PA", "STLAP.PA", "STMPA.PA", "TEP.PA", "HO.PA", "TTE.PA", "URW.PA",
    "VIE.PA", "DG.PA", "WLN.PA",
];

/// Pipeline settings, read from a TOML file.
///
/// ```toml
/// tickers = ["AI.PA", "MC.PA"]
/// data_lake_dir = "./financial_data_lake"
/// quarantine_path = "./unvalid_data.csv"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub tickers: Vec<String>,
    pub data_lake_dir: PathBuf,
    pub export_dir: PathBuf,
    pub quarantine_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tickers: CAC40_TICKERS.iter().map(|ticker| ticker.to_string()).collect(),
            data_lake_dir: PathBuf::from("./financial_data_lake"),
            export_dir: PathBuf::from("./intraday_directory"),
            quarantine_path: PathBuf::from("./unvalid_data.csv"),
            log_dir: PathBuf::from("./logs"),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from a file when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Configured tickers, validated, in configuration order.
    pub fn symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        self.tickers
            .iter()
            .map(|ticker| Symbol::parse(ticker).map_err(ConfigError::from))
            .collect()
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join("Today_Data.csv")
    }

    pub fn daily_log_path(&self) -> PathBuf {
        self.log_dir.join("daily_update.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_track_the_cac40_basket() {
        let config = PipelineConfig::default();
        let symbols = config.symbols().expect("valid defaults");
        assert_eq!(symbols.len(), 40);
        assert_eq!(symbols[0].as_str(), "AI.PA");
        assert_eq!(config.export_path(), PathBuf::from("./intraday_directory/Today_Data.csv"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
tickers = ["mc.pa"]
quarantine_path = "/tmp/q.csv"
"#,
        )
        .expect("parse");

        assert_eq!(config.symbols().expect("symbols")[0].as_str(), "MC.PA");
        assert_eq!(config.quarantine_path, PathBuf::from("/tmp/q.csv"));
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
    }

    #[test]
    fn unknown_keys_and_bad_tickers_are_rejected() {
        assert!(PipelineConfig::from_toml_str("ticker = []").is_err());

        let config = PipelineConfig::from_toml_str(r#"tickers = ["AI/PA"]"#).expect("parse");
        assert!(matches!(config.symbols(), Err(ConfigError::Ticker(_))));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = PipelineConfig::load(Path::new("/nonexistent/tickgate.toml")).expect_err("missing");
        assert!(error.to_string().contains("/nonexistent/tickgate.toml"));
    }
}
