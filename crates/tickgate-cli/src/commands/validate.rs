//! Validate the latest row of one lake file and print the report.

use tickgate_core::lake;
use tickgate_core::pipeline::log_checks;
use tickgate_core::{RowValidator, ValidationPolicy};

use crate::cli::ValidateArgs;
use crate::error::CliError;

use super::{parse_day, CommandResult};

pub fn run(args: &ValidateArgs) -> Result<CommandResult, CliError> {
    let history = lake::read_history(&args.file).map_err(CliError::command)?;
    let policy = ValidationPolicy::as_of(parse_day(args.as_of.as_deref())?);

    let report = RowValidator::new(policy)
        .validate_latest(&history)
        .map_err(CliError::command)?;
    log_checks(&report);

    let warnings = report
        .rejection()
        .map(|invalid| vec![format!("{}: {}", invalid.symbol, invalid.type_error())])
        .unwrap_or_default();

    Ok(CommandResult::ok("validate", serde_json::to_value(&report)?).with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_lake_file(dir: &std::path::Path, close: &str) -> std::path::PathBuf {
        let path = dir.join("AI.PA_Historical_Data.csv");
        fs::write(
            &path,
            format!(
                "Date,Open,High,Low,Close,Volume,Dividends,Stock_Splits,date_modification\n\
                 2024-03-01,10.5,11,10,{close},1000,0,0,2024-03-01 18:00:00\n"
            ),
        )
        .expect("write");
        path
    }

    #[test]
    fn clean_file_reports_acceptance() {
        let temp = tempfile::tempdir().expect("tempdir");
        let args = ValidateArgs {
            file: write_lake_file(temp.path(), "10.8"),
            as_of: Some(String::from("2024-03-01")),
        };

        let result = run(&args).expect("validate");
        assert_eq!(result.data["outcome"]["status"], "accepted");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn malformed_file_reports_the_tag_as_warning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let args = ValidateArgs {
            file: write_lake_file(temp.path(), "abc"),
            as_of: Some(String::from("2024-03-01")),
        };

        let result = run(&args).expect("validate");
        assert_eq!(result.data["outcome"]["status"], "rejected");
        assert_eq!(result.data["outcome"]["row"]["tags"][0], "'Close' format");
        assert_eq!(result.warnings, vec!["AI.PA: 'Close' format".to_string()]);
    }

    #[test]
    fn unrecognized_file_name_is_a_command_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("prices.csv");
        fs::write(&path, "Date\n2024-03-01\n").expect("write");

        let error = run(&ValidateArgs {
            file: path,
            as_of: None,
        })
        .expect_err("no ticker in name");
        assert_eq!(error.exit_code(), 2);
    }
}
