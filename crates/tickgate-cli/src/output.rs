use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::commands::CommandResult;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    command: &'a str,
    data: &'a Value,
    warnings: &'a [String],
}

/// Write the command result to stdout as one JSON document.
pub fn render(result: &CommandResult, pretty: bool) -> Result<(), CliError> {
    let envelope = Envelope {
        command: result.command,
        data: &result.data,
        warnings: &result.warnings,
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut handle, &envelope)?;
    } else {
        serde_json::to_writer(&mut handle, &envelope)?;
    }
    writeln!(handle)?;
    Ok(())
}
