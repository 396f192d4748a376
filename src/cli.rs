//! Minimal CLI parsing for the run command.

use std::env;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Command {
    /// Run the cache poll scheduler until interrupted
    #[default]
    Run,
    /// One-off search: `search <show> <season> [episode]`
    Search {
        show: String,
        season: u32,
        episode: Option<u32>,
    },
    /// List available providers
    Providers,
}

#[derive(Debug, Default)]
pub struct CliOptions {
    pub command: Command,
}

impl CliOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("run") => Command::Run,
            Some("providers") => Command::Providers,
            Some("search") => {
                let show = args.next().context("search: missing show name")?;
                let season = args
                    .next()
                    .context("search: missing season")?
                    .parse()
                    .context("search: invalid season")?;
                let episode = args
                    .next()
                    .map(|e| e.parse())
                    .transpose()
                    .context("search: invalid episode")?;
                Command::Search {
                    show,
                    season,
                    episode,
                }
            }
            Some(other) => bail!("Unknown command: {}", other),
        };

        Ok(CliOptions { command })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        CliOptions::parse(args.iter().map(|a| a.to_string())).map(|o| o.command)
    }

    #[test]
    fn test_default_is_run() {
        assert_eq!(parse(&[]).unwrap(), Command::Run);
        assert_eq!(parse(&["run"]).unwrap(), Command::Run);
    }

    #[test]
    fn test_search() {
        assert_eq!(
            parse(&["search", "Top Gear", "19"]).unwrap(),
            Command::Search {
                show: "Top Gear".to_string(),
                season: 19,
                episode: None,
            }
        );
        assert_eq!(
            parse(&["search", "Top Gear", "19", "3"]).unwrap(),
            Command::Search {
                show: "Top Gear".to_string(),
                season: 19,
                episode: Some(3),
            }
        );
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["search"]).is_err());
        assert!(parse(&["search", "Top Gear", "nineteen"]).is_err());
        assert!(parse(&["search", "Top Gear", "19", "x"]).is_err());
        assert!(parse(&["--tray"]).is_err());
    }
}
