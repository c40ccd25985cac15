//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Download manga series and chapters.
///
/// Pass a series or chapter URL, or a short identifier such as
/// `jaiminis-box:my-hero-academia` (series) or
/// `jaiminis-box:my-hero-academia:c25` (chapter).
#[derive(Parser, Debug)]
#[command(name = "poketo")]
#[command(author, version, about)]
#[command(after_help = "\
Examples:

  Download a chapter
    $ poketo http://merakiscans.com/senryu-girl/5/
    $ poketo https://mangadex.org/chapter/269022
    $ poketo jaiminis-box:my-hero-academia:c25

  Download an entire series
    $ poketo http://merakiscans.com/senryu-girl/
    $ poketo https://mangadex.org/title/13127
    $ poketo jaiminis-box:my-hero-academia")]
pub struct Args {
    /// Series or chapter URL, or a short identifier (site:series[:chapter])
    #[arg(value_name = "URL | ID")]
    pub input: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_accepts_url() {
        let args = Args::try_parse_from(["poketo", "https://mangadex.org/title/13127"]).unwrap();
        assert_eq!(args.input, "https://mangadex.org/title/13127");
    }

    #[test]
    fn test_cli_accepts_short_identifier() {
        let args = Args::try_parse_from(["poketo", "jaiminis-box:my-hero-academia:c25"]).unwrap();
        assert_eq!(args.input, "jaiminis-box:my-hero-academia:c25");
    }

    #[test]
    fn test_cli_missing_input_is_usage_error() {
        let err = Args::try_parse_from(["poketo"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let err = Args::try_parse_from(["poketo", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("Download an entire series"));
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["poketo", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        let err = Args::try_parse_from(["poketo", "--concurrency", "5", "x:y"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_rejects_second_input() {
        let result = Args::try_parse_from(["poketo", "a:b", "c:d"]);
        assert!(result.is_err());
    }
}
