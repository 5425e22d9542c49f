use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use clientperms_core::{
    command::{self, CommandContext, CommandOutput},
    logging, ModVersionRegistry,
};

const USAGE: &str = "usage: clientperms [DATA_DIR]\n\n\
Reads admin commands from stdin against DATA_DIR/mods.yml.\n\
DATA_DIR defaults to $CLIENTPERMS_DATA_DIR, then the current directory.";

/// What the command line asked for.
#[derive(Debug, PartialEq, Eq)]
enum Launch {
    Console(PathBuf),
    Usage,
}

/// Resolve the data directory holding `mods.yml`.
///
/// Precedence: first CLI argument > `CLIENTPERMS_DATA_DIR` > current directory.
/// Arguments that look like flags are never taken as a directory.
fn parse_launch(arg: Option<OsString>, env_dir: Option<OsString>) -> Result<Launch> {
    if let Some(arg) = &arg {
        match arg.to_str() {
            Some("-h" | "--help") => return Ok(Launch::Usage),
            Some(flag) if flag.starts_with('-') => {
                bail!("unknown option '{flag}'\n\n{USAGE}")
            }
            _ => {}
        }
    }

    let dir = arg
        .or(env_dir)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Launch::Console(dir))
}

fn main() -> Result<()> {
    let dir = match parse_launch(env::args_os().nth(1), env::var_os("CLIENTPERMS_DATA_DIR"))? {
        Launch::Console(dir) => dir,
        Launch::Usage => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    logging::init();
    tracing::info!(data_dir = %dir.display(), "starting clientperms console");

    let mut registry = ModVersionRegistry::initialize(&dir);
    let commands = command::builtin_registry();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read console input")?;
        let mut ctx = CommandContext {
            registry: &mut registry,
        };

        match commands.execute(line.trim(), &mut ctx) {
            CommandOutput::Lines(lines) => {
                for line in lines {
                    writeln!(stdout, "{line}").context("failed to write console output")?;
                }
                stdout.flush().context("failed to write console output")?;
            }
            CommandOutput::Quit => break,
        }
    }

    tracing::info!("console session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(arg: Option<&str>, env_dir: Option<&str>) -> Result<Launch> {
        parse_launch(arg.map(OsString::from), env_dir.map(OsString::from))
    }

    #[test]
    fn argument_wins_over_env() {
        assert_eq!(
            launch(Some("plugins/ClientPermissions"), Some("/srv/perms")).unwrap(),
            Launch::Console(PathBuf::from("plugins/ClientPermissions"))
        );
    }

    #[test]
    fn env_then_current_directory() {
        assert_eq!(
            launch(None, Some("/srv/perms")).unwrap(),
            Launch::Console(PathBuf::from("/srv/perms"))
        );
        assert_eq!(launch(None, None).unwrap(), Launch::Console(PathBuf::from(".")));
    }

    #[test]
    fn help_flags_show_usage() {
        assert_eq!(launch(Some("--help"), None).unwrap(), Launch::Usage);
        assert_eq!(launch(Some("-h"), Some("/srv/perms")).unwrap(), Launch::Usage);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = launch(Some("--data"), None).unwrap_err().to_string();
        assert!(err.contains("unknown option '--data'"));
        assert!(err.contains("usage: clientperms"));
    }
}
