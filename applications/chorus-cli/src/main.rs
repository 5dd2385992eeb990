//! Chorus CLI - resolve audio requests against a fixture catalog
use anyhow::Context;
use chorus_core::types::{flags, CommandInput, PlaybackTarget, ProviderHint, Requester};
use chorus_core::{LoadedEntity, Outcome, Resolution};
use chorus_resolver::gate::PendingQuestion;
use chorus_resolver::memory::MemoryProviders;
use chorus_resolver::{
    BoundedRedirectExecutor, ChannelDisambiguator, PlayableResolver, ResolveRequest,
    ResolverConfig, StandardSyntax,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-cli")]
#[command(about = "Resolve audio requests into playables", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request against a fixture catalog, asking on stdin when needed
    Resolve {
        /// JSON fixture with the catalog contents
        #[arg(long)]
        catalog: PathBuf,

        /// Requester issuing the request
        #[arg(long, default_value = "u1")]
        requester: String,

        /// Scope local playlists are looked up in
        #[arg(long, default_value = "default")]
        scope: String,

        /// Resolve catalog items to streams in the background
        #[arg(long)]
        redirect: bool,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Show which resolution path a request would take
    Classify {
        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Load a playlist
    #[arg(long)]
    list: bool,

    /// Load an album
    #[arg(long)]
    album: bool,

    /// Load a single podcast episode
    #[arg(long)]
    episode: bool,

    /// Load every episode of a podcast show
    #[arg(long)]
    podcast: bool,

    /// Choose among several results, optionally limiting their number
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    select: Option<String>,

    /// Search the requester's own library (requires a login)
    #[arg(long)]
    own: bool,

    /// Provider to search: catalog, video, peer-audio or local
    #[arg(long)]
    provider: Option<String>,

    /// Request text, URL or provider URI
    #[arg(required = true)]
    input: Vec<String>,
}

impl RequestArgs {
    fn command_input(&self) -> anyhow::Result<CommandInput> {
        let mut input = CommandInput::new(self.input.join(" "));

        for (set, name) in [
            (self.list, flags::LIST),
            (self.album, flags::ALBUM),
            (self.episode, flags::EPISODE),
            (self.podcast, flags::PODCAST),
            (self.own, flags::OWN),
        ] {
            if set {
                input = input.flag(name);
            }
        }

        match self.select.as_deref() {
            Some("") => input = input.flag(flags::SELECT),
            Some(limit) => input = input.flag_value(flags::SELECT, limit),
            None => {}
        }

        if let Some(provider) = &self.provider {
            let hint: ProviderHint = provider.parse()?;
            input = input.flag(match hint {
                ProviderHint::Catalog => flags::SPOTIFY,
                ProviderHint::Video => flags::YOUTUBE,
                ProviderHint::PeerAudio => flags::SOUNDCLOUD,
                ProviderHint::Local => flags::LOCAL,
            });
        }

        Ok(input)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_resolver=info,chorus_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ResolverConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Resolve {
            catalog,
            requester,
            scope,
            redirect,
            request,
        } => {
            let input = request.command_input()?;
            let requester = Requester::new(requester, scope);
            resolve(config, &catalog, input, requester, redirect).await?;
        }
        Commands::Classify { request } => {
            let input = request.command_input()?;
            let syntax = StandardSyntax::new(config.catalog_uri_scheme.clone());
            let source = chorus_resolver::classify(&input, &syntax, config.default_provider);
            println!("{}", serde_json::to_string(&source)?);
        }
    }

    Ok(())
}

async fn resolve(
    config: ResolverConfig,
    catalog: &Path,
    input: CommandInput,
    requester: Requester,
    redirect: bool,
) -> anyhow::Result<()> {
    let fixture = tokio::fs::read_to_string(catalog)
        .await
        .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
    let providers = Arc::new(MemoryProviders::from_json(&fixture).context("Invalid catalog")?);
    info!(catalog = %catalog.display(), "Loaded fixture catalog");

    let executor = BoundedRedirectExecutor::new(providers.clone(), config.redirect_concurrency)?;
    let (disambiguator, questions) = ChannelDisambiguator::channel(1);
    let collaborators = providers.collaborators(
        Arc::new(StandardSyntax::new(config.catalog_uri_scheme.clone())),
        Arc::new(executor),
        Arc::new(disambiguator),
    );
    let resolver = PlayableResolver::new(config, collaborators);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });
    tokio::spawn(answer_questions(questions));

    let request = ResolveRequest::new(input, requester)
        .with_redirect(redirect)
        .with_cancel(cancel);

    match resolver.resolve(&request).await? {
        Outcome::Delivered(resolution) => print_resolution(&resolution, redirect).await,
        Outcome::Cancelled => println!("Cancelled."),
    }

    Ok(())
}

/// Print each question and answer it from stdin; an empty line declines
async fn answer_questions(mut questions: mpsc::Receiver<PendingQuestion>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(mut pending) = questions.recv().await {
        loop {
            print!("{}", pending.question());
            println!("Choose an option (empty to cancel):");

            let answer = match lines.next_line().await {
                Ok(Some(line)) if !line.trim().is_empty() => line,
                _ => {
                    debug!("No answer given");
                    pending.cancel();
                    break;
                }
            };

            match pending.choose(&answer) {
                Ok(()) => break,
                Err(unanswered) => {
                    println!("No option '{}'.", answer.trim());
                    pending = unanswered;
                }
            }
        }
    }
}

async fn print_resolution(resolution: &Resolution, redirect: bool) {
    let entity = resolution.entity();
    match entity {
        LoadedEntity::CatalogTrack(_)
        | LoadedEntity::CatalogEpisode(_)
        | LoadedEntity::Video(_)
        | LoadedEntity::PeerAudioTrack(_) => println!("Loaded {}: {}", entity.kind(), entity.name()),
        _ => println!(
            "Loaded {} '{}' with {} items",
            entity.kind(),
            entity.name(),
            resolution.loaded_amount()
        ),
    }

    for (position, playable) in resolution.playables().iter().enumerate() {
        println!("{:>3}. {}", position + 1, playable.display());

        if redirect {
            match playable.playback_target().await {
                Ok(PlaybackTarget::Stream(stream)) => println!("     -> {}", stream.url),
                Ok(PlaybackTarget::Catalog { uri }) => println!("     -> {}", uri),
                Err(e) => println!("     -> {}", e),
            }
        }
    }
}
