use std::path::PathBuf;

use clap::Parser;

use crate::config::Options;

#[derive(Parser, Debug)]
#[command(
    name = "license-ripper",
    about = "Resolve the licenses of a project's npm dependencies from their license texts",
    version
)]
pub struct Cli {
    /// Project root to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report format
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Write the report to a file (compact JSON) instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Options file [default: ./.license-ripper/config.toml, fallback ~/.config/license-ripper/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include devDependencies
    #[arg(long)]
    pub include_dev: bool,

    /// Add each package's homepage URL
    #[arg(long)]
    pub include_homepage: bool,

    /// Add each package's normalized repository URL
    #[arg(long)]
    pub include_repository: bool,

    /// Add each package's funding URLs
    #[arg(long)]
    pub include_funding: bool,

    /// Only report these packages (repeatable)
    #[arg(long, value_name = "NAME")]
    pub include: Vec<String>,

    /// Never report these packages (repeatable)
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Cache folder for remote lookups [default: <PATH>/node_modules/.cache/license-ripper]
    #[arg(long, value_name = "DIR", conflicts_with = "no_cache")]
    pub cache_folder: Option<PathBuf>,

    /// Disable the remote lookup cache
    #[arg(long)]
    pub no_cache: bool,

    /// Delete cached licenses instead of resolving licenses
    #[arg(long)]
    pub clean: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// The resolved packages
    Json,
    /// Resolved packages with identical license texts stored once
    Compress,
    /// Package count per license expression
    Summary,
    /// A table on stdout
    Table,
}

impl Cli {
    /// Layer command-line flags on top of options loaded from a config file.
    pub fn apply_to(&self, options: &mut Options) {
        options.include_dev |= self.include_dev;
        options.include_homepage |= self.include_homepage;
        options.include_repository |= self.include_repository;
        options.include_funding |= self.include_funding;
        options.include.extend(self.include.iter().cloned());
        options.exclude.extend(self.exclude.iter().cloned());

        if self.no_cache {
            options.cache_folder = Some(PathBuf::new());
        } else if let Some(folder) = &self.cache_folder {
            options.cache_folder = Some(folder.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_layer_over_config() {
        let cli = Cli::parse_from([
            "license-ripper",
            "app",
            "--include-dev",
            "--exclude",
            "fsevents",
            "--no-cache",
            "--report",
            "summary",
        ]);
        assert_eq!(cli.path, PathBuf::from("app"));
        assert_eq!(cli.report, ReportFormat::Summary);

        let mut options = Options {
            include_homepage: true,
            exclude: vec!["left-pad".into()],
            ..Options::default()
        };
        cli.apply_to(&mut options);

        assert!(options.include_dev);
        assert!(options.include_homepage);
        assert_eq!(options.exclude, vec!["left-pad", "fsevents"]);
        assert_eq!(options.cache_folder, Some(PathBuf::new()));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["license-ripper"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.report, ReportFormat::Json);
        assert!(cli.output.is_none());

        let mut options = Options::default();
        cli.apply_to(&mut options);
        assert!(options.cache_folder.is_none());
    }

    #[test]
    fn test_cache_folder_conflicts_with_no_cache() {
        assert!(Cli::try_parse_from(["license-ripper", "--cache-folder", "c", "--no-cache"]).is_err());
    }
}
