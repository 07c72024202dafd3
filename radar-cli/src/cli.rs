use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::Password;
use radar_core::{
    AgentId, Config, Nowcast, NwsStationResolver, RadarImageFetcher, RadarImageResult,
    RadarRequest, Relay, agent::default_agent_from_config, points_url, radar_image_url,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "radar", version, about = "Radar nowcast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an API key for an agent backend.
    Configure {
        /// Agent short name, e.g. "gemini".
        agent: String,

        /// Make this agent the default even if another one is set.
        #[arg(long)]
        default: bool,
    },

    /// Print the NWS points URL for a coordinate pair.
    Points {
        #[arg(allow_hyphen_values = true)]
        latitude: String,
        #[arg(allow_hyphen_values = true)]
        longitude: String,
    },

    /// Print the RIDGE still-image URL for a station.
    ImageUrl {
        /// Station id, e.g. "KOKX".
        station: String,
    },

    /// Run the radar image tool and print its JSON result.
    Fetch {
        url: String,

        /// Replace the base64 payload with its length.
        #[arg(long)]
        omit_payload: bool,
    },

    /// Fetch a radar frame and ask the agent for a nowcast.
    Nowcast(NowcastArgs),
}

#[derive(Debug, Args)]
pub struct NowcastArgs {
    /// Full still-image URL.
    #[arg(long, conflicts_with_all = ["station", "lat", "lon"])]
    url: Option<String>,

    /// Radar station id, e.g. "KOKX".
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    station: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<String>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<String>,

    /// Override the configured model.
    #[arg(long)]
    model: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { agent, default } => configure(&agent, default),
            Command::Points { latitude, longitude } => {
                println!("{}", points_url(&latitude, &longitude));
                Ok(())
            }
            Command::ImageUrl { station } => {
                println!("{}", radar_image_url(&station));
                Ok(())
            }
            Command::Fetch { url, omit_payload } => fetch(&url, omit_payload).await,
            Command::Nowcast(args) => nowcast(args).await,
        }
    }
}

fn configure(agent: &str, make_default: bool) -> anyhow::Result<()> {
    let id = AgentId::try_from(agent)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let replaced = store_api_key(&mut config, id, api_key.trim(), make_default);
    config.save()?;

    let verb = if replaced { "Replaced" } else { "Saved" };
    println!("{verb} credentials for {id} in {}", Config::config_file_path()?.display());
    Ok(())
}

/// Returns whether a key for `id` was already present.
fn store_api_key(config: &mut Config, id: AgentId, api_key: &str, make_default: bool) -> bool {
    let replaced = config.is_agent_configured(id);
    config.upsert_agent_api_key(id, api_key.to_string());
    if make_default {
        config.set_default_agent(id);
    }
    replaced
}

async fn fetch(url: &str, omit_payload: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let fetcher = RadarImageFetcher::with_timeout(config.fetch_timeout())?;

    let mut result = fetcher.fetch(url).await;
    if let (true, RadarImageResult::Success(image)) = (omit_payload, &mut result) {
        image.media.base64_data = format!("<{} base64 chars>", image.media.base64_data.len());
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn nowcast(args: NowcastArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    let mut settings = config.agent_settings();
    if let Some(model) = args.model {
        settings = settings.with_model(model);
    }

    tracing::debug!(agent = %settings.name, model = %settings.model, "starting nowcast");

    let fetcher = RadarImageFetcher::with_timeout(config.fetch_timeout())?;
    let agent = default_agent_from_config(&config)?;
    let relay = Relay::new(settings, fetcher, agent);

    let nowcast = match (args.url, args.station, args.lat, args.lon) {
        (Some(url), _, _, _) => relay.nowcast_url(&url).await?,
        (None, Some(station), _, _) => relay.nowcast_station(&station).await?,
        (None, None, Some(lat), Some(lon)) => {
            let resolver = NwsStationResolver::with_timeout(config.fetch_timeout())?;
            relay.nowcast_point(&RadarRequest::new(lat, lon), &resolver).await?
        }
        _ => bail!("Provide one of --url, --station, or --lat with --lon"),
    };

    print_nowcast(&nowcast);
    Ok(())
}

fn print_nowcast(nowcast: &Nowcast) {
    let station = nowcast.radar_id.as_deref().unwrap_or("unknown station");
    println!("{station} @ {}", nowcast.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!("{}", nowcast.source_url);
    println!();
    println!("{}", nowcast.text);
}
