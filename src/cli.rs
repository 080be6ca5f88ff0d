use crate::config::{ConfigError, DEFAULT_REGION, PurgeConfig};
use clap::{ArgAction, Parser};
use clap_complete::Shell;
use tracing::Level;
use url::Url;

pub const fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
        .valid(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .placeholder(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))),
        )
}

#[allow(async_fn_in_trait)]
pub trait Process {
    async fn process(self) -> anyhow::Result<i32>;
}

/// Delete all objects and versions under a given bucket and prefix.
///
/// Credentials must be passed explicitly; create a dedicated user for each
/// delete operation so it cannot touch anything it should not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[clap(version, styles=get_styles(), disable_version_flag = true)]
pub struct Args {
    #[arg(long = "generate", value_enum)]
    pub generator: Option<Shell>,

    /// S3 bucket name
    #[arg(long, value_name = "bucket")]
    pub bucket: Option<String>,

    /// Object prefix
    #[arg(long, value_name = "prefix")]
    pub prefix: Option<String>,

    /// AWS access key ID
    #[arg(long, value_name = "accessKeyId")]
    pub access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, value_name = "secretAccessKey")]
    pub secret_access_key: Option<String>,

    /// Region to sign requests for
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Endpoint of an S3-compatible store (R2, MinIO, ...)
    #[arg(long, value_parser = Url::parse)]
    pub endpoint_url: Option<Url>,

    /// Verbosity of the audit log on stderr
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Print version
    // only carries the `-v` flag, clap prints and exits before it is ever set
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Args {
    /// Turns the parsed flags into an explicit config, without touching the network.
    pub fn to_config(&self) -> Result<PurgeConfig, ConfigError> {
        Ok(PurgeConfig::try_new(
            self.bucket.clone(),
            self.prefix.clone(),
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
        )?
        .with_region(self.region.clone())
        .with_endpoint_url(self.endpoint_url.clone()))
    }
}
