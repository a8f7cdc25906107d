//! # Profile Subcommand
//!
//! Loads an ASPSP profile from a YAML file or from the environment,
//! validates it, and prints the effective settings.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use obsca_engine::AspspProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Arguments for the `obsca profile` subcommand.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Profile file. Falls back to `OBSCA_PROFILE` and the other
    /// `OBSCA_*` variables when omitted.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output format for the effective profile.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

/// Execute the profile subcommand.
///
/// Returns exit code: 0 when the profile is valid, 1 otherwise.
pub fn run_profile(args: &ProfileArgs) -> Result<u8> {
    let profile = match crate::load_profile(args.path.as_deref()) {
        Ok(profile) => profile,
        Err(e) => {
            println!("FAIL: {e:#}");
            return Ok(1);
        }
    };
    tracing::info!(approaches = ?profile.sca_approaches, "profile loaded");
    print!("{}", render(&profile, args.format)?);
    Ok(0)
}

fn render(profile: &AspspProfile, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(profile)?,
        OutputFormat::Json => serde_json::to_string_pretty(profile)? + "\n",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_yaml_round_trips() {
        let profile = AspspProfile::default();
        let yaml = render(&profile, OutputFormat::Yaml).unwrap();
        assert_eq!(AspspProfile::from_yaml_str(&yaml).unwrap(), profile);
    }

    #[test]
    fn test_render_json_uses_wire_names() {
        let json = render(&AspspProfile::default(), OutputFormat::Json).unwrap();
        assert!(json.contains("\"REDIRECT\""));
        assert!(json.contains("redirect_url_expiration_secs"));
    }

    #[test]
    fn test_invalid_profile_exits_one() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sca_approaches: [EMBEDDED, EMBEDDED]").unwrap();
        let args = ProfileArgs {
            path: Some(file.path().to_path_buf()),
            format: OutputFormat::Yaml,
        };
        assert_eq!(run_profile(&args).unwrap(), 1);
    }

    #[test]
    fn test_valid_profile_exits_zero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sca_approaches: [DECOUPLED]").unwrap();
        let args = ProfileArgs {
            path: Some(file.path().to_path_buf()),
            format: OutputFormat::Json,
        };
        assert_eq!(run_profile(&args).unwrap(), 0);
    }
}
