use std::path::{Path, PathBuf};

use atelier::config::StudioConfig;
use atelier::error::{CaptureError, ConfigError, ErrorCode, GenerationError, TransportError};
use atelier::studio::Studio;
use canvas::camera::Rect;
use canvas::doc::{ImagePayload, SceneObject};
use canvas::render::SoftwareRasterizer;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("--frame takes exactly four numbers: x,y,width,height")]
    InvalidFrame,
    #[error("could not read base image {path}: {reason}")]
    BaseImage { path: PathBuf, reason: String },
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Transport(e) => e.error_code(),
            Self::Generation(e) => e.error_code(),
            Self::Capture(e) => e.error_code(),
            Self::InvalidFrame => "E_CLI_FRAME",
            Self::BaseImage { .. } => "E_CLI_BASE_IMAGE",
            Self::Io(_) => "E_CLI_IO",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "atelier", about = "Atelier generation client")]
struct Cli {
    /// API root; overrides ATELIER_BASE_URL from the environment config.
    #[arg(long, env = "ATELIER_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "ATELIER_PASSWORD")]
        password: String,
    },
    Register {
        username: String,
        #[arg(long, env = "ATELIER_PASSWORD")]
        password: String,
    },
    Logout,
    /// Show the signed-in user and balance.
    Me,
    Templates {
        #[arg(long)]
        category: Option<String>,
        /// Fill each template's subject placeholder.
        #[arg(long)]
        subject: Option<String>,
    },
    Image {
        prompt: String,
    },
    Video {
        prompt: String,
    },
    /// Widescreen video preset (1920x1080, 10s).
    Veo {
        prompt: String,
    },
    Music {
        prompt: String,
    },
    Avatar {
        text: String,
    },
    Recharge {
        amount: f64,
    },
    /// Regenerate a region of a scene and write the merged result.
    Canvas {
        prompt: String,
        /// Frame in world units: x,y,width,height. Whole surface if omitted.
        #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values = true)]
        frame: Option<Vec<f64>>,
        /// Image placed at the origin before capture.
        #[arg(long)]
        base: Option<PathBuf>,
        #[arg(long, default_value = "canvas.png")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(code = e.error_code(), error = %e, "command failed");
    }
    result
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = StudioConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url)?;
    }
    let mut studio = Studio::from_config(&config)?;

    match cli.command {
        Command::Login { username, password } => {
            let user = studio.login(&username, &password).await?;
            println!("logged in as {} (balance {:.2})", user.username, user.balance);
        }
        Command::Register { username, password } => {
            let user = studio.register(&username, &password).await?;
            println!("registered {} (balance {:.2})", user.username, user.balance);
        }
        Command::Logout => {
            studio.logout()?;
            println!("logged out");
        }
        Command::Me => {
            studio.startup().await?;
            let cached = studio.session().session().and_then(|s| s.user.clone());
            let user = match cached {
                Some(user) => user,
                None => studio.refresh_profile().await?,
            };
            println!("{} (id {}) balance {:.2}", user.username, user.id, user.balance);
        }
        Command::Templates { category, subject } => {
            let catalog = studio.load_templates().await?;
            let selected: Vec<_> = match category.as_deref() {
                Some(c) => catalog.by_category(c).collect(),
                None => catalog.iter().collect(),
            };
            for template in selected {
                let content = match &subject {
                    Some(s) => template.apply(s),
                    None => template.content.clone(),
                };
                let tag = template.category.as_deref().unwrap_or("-");
                println!("{}\t[{tag}]\t{content}", template.name);
            }
        }
        Command::Image { prompt } => {
            studio.startup().await?;
            let result = studio.generate_image(&prompt).await?;
            println!("{}", result.image_url);
        }
        Command::Video { prompt } => {
            studio.startup().await?;
            let result = studio.generate_video(&prompt).await?;
            println!("{}", result.video_url);
        }
        Command::Veo { prompt } => {
            studio.startup().await?;
            let result = studio.generate_veo(&prompt).await?;
            println!("{}", result.video_url);
        }
        Command::Music { prompt } => {
            studio.startup().await?;
            let result = studio.generate_music(&prompt).await?;
            println!("{}", result.audio_url);
        }
        Command::Avatar { text } => {
            studio.startup().await?;
            let result = studio.generate_avatar(&text).await?;
            println!("{}", result.video_url);
        }
        Command::Recharge { amount } => {
            studio.startup().await?;
            let result = studio.recharge(amount).await?;
            println!("{}", result.message.unwrap_or_else(|| "recharged".to_owned()));
        }
        Command::Canvas { prompt, frame, base, out } => {
            studio.startup().await?;
            run_canvas(&mut studio, &prompt, frame, base, &out).await?;
        }
    }

    if let Some(balance) = studio.balance() {
        let stale = studio.session().session().is_some_and(|s| s.balance_stale);
        eprintln!("balance: {balance:.2}{}", if stale { " (stale)" } else { "" });
    }
    studio.dispose();
    Ok(())
}

async fn run_canvas(
    studio: &mut Studio,
    prompt: &str,
    frame: Option<Vec<f64>>,
    base: Option<PathBuf>,
    out: &Path,
) -> Result<(), CliError> {
    if let Some(path) = base {
        let pixels = image::open(&path)
            .map_err(|e| CliError::BaseImage { path: path.clone(), reason: e.to_string() })?
            .to_rgba8();
        let (w, h) = pixels.dimensions();
        let rect = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        let payload = ImagePayload::new(pixels, Some(path.display().to_string()));
        studio.engine_mut().scene.add(SceneObject::image(rect, payload));
    }
    if let Some(values) = frame {
        let [x, y, width, height] = values[..] else {
            return Err(CliError::InvalidFrame);
        };
        studio.engine_mut().set_frame(Rect::new(x, y, width, height));
    }

    let result = studio.generate_canvas(prompt).await?;
    println!("{}", result.image_url);

    // Export without the frame outline.
    let engine = studio.engine_mut();
    if let Some(frame_id) = engine.frames.active_id() {
        engine.scene.remove(&frame_id);
        engine.frames.forget(&frame_id);
    }
    let merged = engine.capture_region(&SoftwareRasterizer)?;
    std::fs::write(out, merged.to_png()?)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
