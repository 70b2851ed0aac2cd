/// Desert Zen CLI - drives the client core against a live backend
mod settings;

use anyhow::{bail, Context};
use chrono::Timelike;
use clap::{Parser, Subcommand, ValueEnum};
use settings::{AppConfig, DEFAULT_LOG_FILTER};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zen_backend::BackendClient;
use zen_catalog::{greeting, CatalogLoader, DiscoverFilter};
use zen_core::{CategoryId, Meditation, MeditationId};
use zen_playback::{
    format_clock, spawn_status_pump, SimulatedMediaBackend, TransportController, TransportState,
};
use zen_session::{AuthForm, AuthMode, FavoriteOutcome, SessionConfig, SessionManager};
use zen_theme::{ColorScheme, ThemeStore};

#[derive(Parser)]
#[command(name = "zen")]
#[command(about = "Desert Zen meditation client", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the meditation catalog
    Catalog {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
        /// Search titles and descriptions
        #[arg(short, long)]
        search: Option<String>,
        /// Only this length label, e.g. "10m"
        #[arg(short, long)]
        duration: Option<String>,
    },
    /// Sign in with email and password
    SignIn {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ZEN_PASSWORD")]
        password: String,
    },
    /// Create an account
    SignUp {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ZEN_PASSWORD")]
        password: String,
        #[arg(short, long)]
        name: String,
    },
    /// Email a password reset link
    ResetPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Resend the sign-up confirmation email
    ResendConfirmation {
        #[arg(short, long)]
        email: String,
    },
    /// List favorites, optionally toggling one first
    Favorites {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "ZEN_PASSWORD")]
        password: String,
        /// Meditation id to add or remove
        #[arg(long)]
        toggle: Option<String>,
    },
    /// Handle an auth callback URL from an email link
    Callback {
        url: String,
        /// New password to set when the link is a recovery link
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Play a meditation on the simulated media backend
    Play {
        /// Meditation id
        id: String,
        /// Stop after this many seconds
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Volume 0.0-1.0 (default from config)
        #[arg(long)]
        volume: Option<f32>,
    },
    /// Print the active color palette
    Theme {
        #[arg(long, value_enum, default_value_t = Scheme::Light)]
        scheme: Scheme,
        /// Apply a manual toggle on top of the OS scheme
        #[arg(long)]
        toggle: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Catalog { .. } => "catalog",
            Self::SignIn { .. } => "sign-in",
            Self::SignUp { .. } => "sign-up",
            Self::ResetPassword { .. } => "reset-password",
            Self::ResendConfirmation { .. } => "resend-confirmation",
            Self::Favorites { .. } => "favorites",
            Self::Callback { .. } => "callback",
            Self::Play { .. } => "play",
            Self::Theme { .. } => "theme",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Scheme {
    Light,
    Dark,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());

    // Initialize tracing
    let filter = config
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Theme { scheme, toggle } = cli.command {
        return print_theme(scheme, toggle);
    }

    let config = config?;
    config.validate()?;
    tracing::info!("Backend: {}", config.backend.url);
    let source = cli.config.clone().unwrap_or_else(|| PathBuf::from("config.toml"));
    tracing::debug!(
        config = %source.display(),
        timeout_secs = config.backend.timeout_secs,
        retry_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );
    let client = Arc::new(BackendClient::new(config.backend_config())?);
    tracing::debug!(command = cli.command.name(), "Dispatching command");

    match cli.command {
        Commands::Catalog {
            category,
            search,
            duration,
        } => {
            let filter = DiscoverFilter {
                query: search.unwrap_or_default(),
                category: category.map(CategoryId::new),
                duration,
            };
            catalog(&config, client, filter).await?;
        }
        Commands::SignIn { email, password } => {
            let session = start_session(&config, client).await;
            let mut form = AuthForm {
                email,
                password,
                ..AuthForm::default()
            };
            form.submit(&session).await;
            print_form(&form)?;
            if let Some(user) = session.snapshot().user() {
                println!("{} <{}>", user.name, user.email);
                println!("Favorites: {}", session.favorites().ids().await.len());
            }
        }
        Commands::SignUp {
            email,
            password,
            name,
        } => {
            let session = start_session(&config, client).await;
            let mut form = AuthForm {
                mode: AuthMode::SignUp,
                email,
                password,
                name,
                ..AuthForm::default()
            };
            form.submit(&session).await;
            print_form(&form)?;
        }
        Commands::ResetPassword { email } => {
            let session = start_session(&config, client).await;
            let mut form = AuthForm {
                mode: AuthMode::ForgotPassword,
                email,
                ..AuthForm::default()
            };
            form.submit_forgot_password(&session).await;
            print_form(&form)?;
        }
        Commands::ResendConfirmation { email } => {
            let session = start_session(&config, client).await;
            let mut form = AuthForm {
                email,
                ..AuthForm::default()
            };
            form.resend_confirmation(&session).await;
            print_form(&form)?;
        }
        Commands::Favorites {
            email,
            password,
            toggle,
        } => {
            favorites(&config, client, &email, &password, toggle).await?;
        }
        Commands::Callback { url, new_password } => {
            let session = start_session(&config, client).await;
            let route = session.handle_callback(&url).await?;
            let mut form = AuthForm::new();
            form.apply_route(&route);
            println!("Route: {:?}", route);

            if let (AuthMode::SetNewPassword, Some(password)) = (form.mode, new_password) {
                form.new_password = password.clone();
                form.confirm_new_password = password;
                form.submit_new_password(&session).await;
            }
            print_form(&form)?;
        }
        Commands::Play {
            id,
            seconds,
            volume,
        } => {
            play(&config, client, &id, seconds, volume).await?;
        }
        Commands::Theme { .. } => {}
    }

    Ok(())
}

async fn start_session(config: &AppConfig, client: Arc<BackendClient>) -> SessionManager {
    let session_config = SessionConfig {
        redirect_url: config.redirect_url(),
        retry: config.retry_policy(),
    };
    SessionManager::start(client.clone(), client, session_config).await
}

fn print_form(form: &AuthForm) -> anyhow::Result<()> {
    if let Some(success) = &form.success {
        println!("{}", success);
    }
    if form.show_resend {
        println!("Didn't get the email? Run `zen resend-confirmation --email <EMAIL>`");
    }
    if let Some(error) = &form.error {
        bail!("{}", error);
    }
    Ok(())
}

async fn catalog(
    config: &AppConfig,
    client: Arc<BackendClient>,
    filter: DiscoverFilter,
) -> anyhow::Result<()> {
    let loader = CatalogLoader::new(client, config.retry_policy());
    loader.load().await?;
    let snapshot = loader.snapshot();
    let catalog = &snapshot.catalog;

    println!("{}", greeting(chrono::Local::now().hour(), None));
    println!();

    if !filter.is_active() {
        let featured = catalog.featured();
        if !featured.is_empty() {
            println!("Featured");
            for meditation in featured {
                print_meditation(catalog.category_name(&meditation.category), meditation);
            }
            println!();
        }
    }

    let results = if filter.is_active() {
        catalog.discover(&filter)
    } else {
        catalog.home_list(None)
    };

    println!("Meditations ({})", results.len());
    for meditation in results {
        print_meditation(catalog.category_name(&meditation.category), meditation);
    }

    println!();
    println!("Lengths: {}", catalog.duration_options().join(", "));
    Ok(())
}

fn print_meditation(category: Option<&str>, meditation: &Meditation) {
    println!(
        "  {:<12} {:<32} {:>4}  {}",
        meditation.id,
        meditation.title,
        meditation.length,
        category.unwrap_or("-")
    );
}

async fn favorites(
    config: &AppConfig,
    client: Arc<BackendClient>,
    email: &str,
    password: &str,
    toggle: Option<String>,
) -> anyhow::Result<()> {
    let session = start_session(config, client.clone()).await;
    let snapshot = session.sign_in(email, password).await?;
    let Some(user) = snapshot.user() else {
        bail!("Signed in but the profile could not be loaded ({})", snapshot.state.label());
    };

    if let Some(id) = toggle {
        match session.favorites().toggle(&MeditationId::new(id.as_str())).await? {
            FavoriteOutcome::Added => println!("Added {}", id),
            FavoriteOutcome::Removed => println!("Removed {}", id),
            FavoriteOutcome::RedirectToAuth => bail!("Sign in to save favorites"),
        }
    }

    let loader = CatalogLoader::new(client, config.retry_policy());
    loader.load().await?;
    let snapshot = loader.snapshot();
    let ids = session.favorites().ids().await;
    let favorites = snapshot.catalog.favorites_of(&ids);

    println!("Favorites of {} ({})", user.name, favorites.len());
    for meditation in favorites {
        print_meditation(snapshot.catalog.category_name(&meditation.category), meditation);
    }
    Ok(())
}

async fn play(
    config: &AppConfig,
    client: Arc<BackendClient>,
    id: &str,
    seconds: u64,
    volume: Option<f32>,
) -> anyhow::Result<()> {
    let loader = CatalogLoader::new(client, config.retry_policy());
    loader.load().await?;
    let meditation = loader
        .snapshot()
        .catalog
        .meditation(&MeditationId::new(id))
        .cloned()
        .with_context(|| format!("no meditation with id {}", id))?;

    let backend = Arc::new(SimulatedMediaBackend::default().with_duration(
        meditation.audio_url.clone(),
        Duration::from_secs(u64::from(meditation.duration_minutes) * 60),
    ));
    let transport = Arc::new(Mutex::new(TransportController::new(
        backend,
        config.transport_config(),
    )));
    let pump = spawn_status_pump(&transport, Duration::from_millis(250));

    {
        let mut transport = transport.lock().await;
        if let Some(level) = volume {
            transport.set_volume(level).await?;
        }
        transport.play(&meditation).await?;
    }
    println!("Playing \"{}\" ({})", meditation.title, meditation.length);

    let mut snapshots = transport.lock().await.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = ticker.tick() => {
                let snapshot = snapshots.borrow_and_update().clone();
                println!(
                    "  {} / {}  {:?}",
                    format_clock(snapshot.position.as_millis() as u64),
                    format_clock(snapshot.duration.as_millis() as u64),
                    snapshot.state
                );
                match snapshot.state {
                    TransportState::Failed(reason) => {
                        tracing::error!(meditation = %meditation.id, reason = %reason, "Playback failed");
                        bail!("Playback failed: {}", reason)
                    }
                    TransportState::Paused
                        if !snapshot.duration.is_zero() && snapshot.position >= snapshot.duration =>
                    {
                        println!("Finished");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let position = transport.lock().await.position();
    transport.lock().await.stop().await;
    pump.abort();
    tracing::info!(
        meditation = %meditation.id,
        listened_secs = position.as_secs(),
        "Playback finished"
    );
    Ok(())
}

fn print_theme(scheme: Scheme, toggle: bool) -> anyhow::Result<()> {
    let os_scheme = match scheme {
        Scheme::Light => ColorScheme::Light,
        Scheme::Dark => ColorScheme::Dark,
    };
    let mut store = ThemeStore::new(os_scheme);
    if toggle {
        store.toggle_theme();
    }
    println!("{}", serde_json::to_string_pretty(store.palette())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::try_parse_from(["zen", "play", "m1", "--seconds", "3"]).unwrap();
        assert_eq!(cli.command.name(), "play");

        let cli = Cli::try_parse_from(["zen", "resend-confirmation", "--email", "a@example.com"])
            .unwrap();
        assert_eq!(cli.command.name(), "resend-confirmation");

        let cli = Cli::try_parse_from(["zen", "theme", "--scheme", "dark"]).unwrap();
        assert_eq!(cli.command.name(), "theme");
    }
}
