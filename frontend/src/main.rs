use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use clap::Parser;
use env_logger::{Builder, Env};
use log::{LevelFilter, error, warn};
use pocket_core::session::{
    DisplaySurface, HostShell, InputRouter, LifecycleController, Session, SessionConfig,
};
use pocket_machines::registry::{self, BackendOptions};

mod config;
mod emulator;
mod error;
mod input;
mod picker;
mod screenshot;
mod video;

use emulator::{Paths, TitleNotices, WINDOW_TITLE, Window};
use error::FrontendError;
use video::Video;

#[derive(Parser, Debug)]
#[command(name = "pocket", version, about = "Handheld console emulator front end")]
struct Args {
    /// ROM to start immediately. Press O in the window to pick another.
    rom: Option<PathBuf>,

    /// Emulation backend (see --list-backends).
    #[arg(long)]
    backend: Option<String>,

    /// Config file (default: platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the ROM picker starts in.
    #[arg(long)]
    rom_dir: Option<PathBuf>,

    /// Directory for battery saves and screenshots.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Window width in pixels; the height follows the LCD aspect ratio.
    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    list_backends: bool,

    /// Run as fast as possible instead of at the LCD refresh rate.
    #[arg(long)]
    no_pacing: bool,
}

fn init_logger() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("pocket=info"));
    builder.filter_module("sdl2", LevelFilter::Warn);
    let _ = builder.try_init();
}

fn main() {
    init_logger();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), FrontendError> {
    if args.list_backends {
        for entry in registry::all() {
            println!("{:<10} {}", entry.name, entry.description);
        }
        return Ok(());
    }

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_from_file(&config_path);
    if !config_path.exists()
        && let Err(e) = config::save_to_file(&config_path, &cfg)
    {
        warn!("could not write default config: {e}");
    }

    if let Some(backend) = args.backend {
        cfg.backend = backend;
    }
    if args.rom_dir.is_some() {
        cfg.rom_dir = args.rom_dir;
    }
    if args.save_dir.is_some() {
        cfg.save_dir = args.save_dir;
    }
    if let Some(width) = args.width {
        cfg.window_width = width;
    }
    if args.no_pacing {
        cfg.pacing = false;
    }

    let entry = registry::find(&cfg.backend).ok_or_else(|| FrontendError::UnknownBackend {
        name: cfg.backend.clone(),
        available: registry::all()
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    let session = Session::with_config(SessionConfig {
        idle_wait: cfg.idle_wait(),
    });
    let controller = LifecycleController::new(
        Arc::clone(&session),
        entry.factory(BackendOptions { pacing: cfg.pacing }),
    );

    let (tx, rx) = mpsc::channel();
    let shell = HostShell::new(controller, move |msg: &str| {
        let _ = tx.send(msg.to_string());
    });

    let mut surface = DisplaySurface::new(Arc::clone(&session));
    surface.set_viewport_width(cfg.window_width);

    let sdl = sdl2::init().map_err(FrontendError::Sdl)?;
    let sdl_video = sdl.video().map_err(FrontendError::Sdl)?;
    let video = Video::new(&sdl_video, WINDOW_TITLE, &surface)?;

    let mut window = Window {
        shell,
        router: InputRouter::new(Arc::clone(&session)),
        surface,
        video,
        key_map: input::key_map(&cfg.keys),
        notices: TitleNotices::new(rx),
        paths: Paths {
            rom_dir: cfg.rom_dir(),
            rom_filter: cfg.rom_filter.clone(),
            save_dir: cfg.save_dir(),
            screenshot_dir: cfg.screenshot_dir(),
        },
    };

    if let Some(rom) = args.rom {
        window.start(rom);
    }
    window.run(&sdl)
}
