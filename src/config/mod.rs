pub mod file;

use clap::Parser;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};

pub use file::FileConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "dnc-scrub")]
#[command(about = "Scrub an uploaded number list against do-not-contact reference lists")]
pub struct CliConfig {
    /// Uploaded CSV file to scrub
    #[arg(long)]
    pub input: Option<String>,

    /// Header name of the contact-number column in the upload
    #[arg(long, default_value = "phone")]
    pub column: String,

    /// User the run is charged to
    #[arg(long, default_value = "1")]
    pub user: i64,

    /// Categories to scrub against (tcpa, dnc-complainers, federal-dnc)
    #[arg(long, value_delimiter = ',', default_values_t = [
        "tcpa".to_string(),
        "dnc-complainers".to_string(),
        "federal-dnc".to_string(),
    ])]
    pub categories: Vec<String>,

    /// State labels recorded on the audit row (no effect on matching)
    #[arg(long, value_delimiter = ',')]
    pub states: Vec<String>,

    /// Directory output artifacts are written to
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// CSV export of the reference dataset
    #[arg(long, default_value = "./reference.csv")]
    pub reference_file: String,

    /// JSON file holding credit balances and the scrub audit log
    #[arg(long, default_value = "./scrub_state.json")]
    pub state_file: String,

    /// Seconds a reference snapshot stays fresh (0 rebuilds every run)
    #[arg(long, default_value = "300")]
    pub reference_refresh_secs: u64,

    /// Optional TOML file supplying deployment defaults
    #[arg(long)]
    pub config: Option<String>,

    /// Add credit to the user's balance before running
    #[arg(long)]
    pub grant: Option<u64>,

    /// Print the user's scrub history and exit
    #[arg(long)]
    pub history: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Folds TOML file defaults into this config. CLI flags that were left
    /// at their defaults take the file's value.
    pub fn with_file_defaults(mut self, file: &FileConfig) -> Self {
        if self.output_path == "./output" {
            if let Some(path) = &file.output_path {
                self.output_path = path.clone();
            }
        }
        if self.reference_file == "./reference.csv" {
            if let Some(path) = &file.reference_file {
                self.reference_file = path.clone();
            }
        }
        if self.state_file == "./scrub_state.json" {
            if let Some(path) = &file.state_file {
                self.state_file = path.clone();
            }
        }
        if self.reference_refresh_secs == 300 {
            if let Some(secs) = file.reference_refresh_secs {
                self.reference_refresh_secs = secs;
            }
        }
        self
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("column", &self.column)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("reference_file", &self.reference_file)?;
        validate_path("state_file", &self.state_file)?;

        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig::parse_from(["dnc-scrub", "--input", "upload.csv"])
    }

    #[test]
    fn defaults_parse_and_validate() {
        let config = base_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.column, "phone");
        assert_eq!(config.categories.len(), 3);
    }

    #[test]
    fn empty_column_fails_validation() {
        let config = CliConfig::parse_from(["dnc-scrub", "--input", "u.csv", "--column", " "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_defaults_fill_untouched_flags_only() {
        let file = FileConfig {
            output_path: Some("/srv/scrub/out".into()),
            reference_file: Some("/srv/scrub/reference.csv".into()),
            state_file: None,
            reference_refresh_secs: Some(60),
        };

        let config = CliConfig::parse_from([
            "dnc-scrub",
            "--input",
            "u.csv",
            "--output-path",
            "/tmp/mine",
        ])
        .with_file_defaults(&file);

        // Explicit flag wins; untouched flags take the file values.
        assert_eq!(config.output_path, "/tmp/mine");
        assert_eq!(config.reference_file, "/srv/scrub/reference.csv");
        assert_eq!(config.state_file, "./scrub_state.json");
        assert_eq!(config.reference_refresh_secs, 60);
    }
}
