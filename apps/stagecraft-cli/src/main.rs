use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stagecraft_input::{Button, InputEvent, InputPlugin, OrbitControls};
use stagecraft_kernel::{DebugTextRenderer, Engine, EngineConfig};
use stagecraft_tools::EngineInspector;

mod demo;

#[derive(Parser)]
#[command(name = "stagecraft-cli", about = "Headless runner for stagecraft scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default engine settings
    Info,
    /// Run the demo scene and print the last rendered frame
    Run {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Run the demo scene and dump engine state
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SceneArgs {
    /// Number of frames to run
    #[arg(short, long, default_value = "120")]
    frames: u64,
    /// YAML engine config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Fixed clock step in seconds (default 1/60)
    #[arg(long, conflicts_with = "realtime")]
    fixed_delta: Option<f32>,
    /// Use the wall clock instead of a fixed step
    #[arg(long)]
    realtime: bool,
    /// Start with the pause flag set
    #[arg(long)]
    paused: bool,
    /// Drag the orbit camera across the scene while running
    #[arg(long)]
    orbit: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagecraft-cli v{}", env!("CARGO_PKG_VERSION"));
            let config = EngineConfig::default();
            println!("default config: {}", serde_json::to_string(&config)?);
        }
        Commands::Run { scene } => {
            let mut engine = build_engine(&scene)?;
            let failures = simulate(&mut engine, &scene)?;

            if let Some(renderer) = engine.renderer_as::<DebugTextRenderer>() {
                print!("{}", renderer.last_frame());
            }
            println!("{}", EngineInspector::summary(&engine));
            if failures > 0 {
                warn!(failures, "hooks failed during the run");
            }
            engine.dispose()?;
        }
        Commands::Inspect { scene, json } => {
            let mut engine = build_engine(&scene)?;
            simulate(&mut engine, &scene)?;

            let summary = EngineInspector::summary(&engine);
            let entities = EngineInspector::list_entities(&engine);
            if json {
                let dump = serde_json::json!({ "summary": summary, "entities": entities });
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!("{summary}");
                for entity in &entities {
                    println!("{entity}");
                }
            }
            engine.dispose()?;
        }
    }

    Ok(())
}

fn load_config(args: &SceneArgs) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.realtime {
        config.fixed_delta = None;
    } else if let Some(step) = args.fixed_delta {
        config.fixed_delta = Some(step);
    } else if config.fixed_delta.is_none() {
        // Headless runs are not vsync-throttled.
        config.fixed_delta = Some(1.0 / 60.0);
    }
    if args.paused {
        config.start_paused = true;
    }
    config.validate()?;
    Ok(config)
}

fn build_engine(args: &SceneArgs) -> anyhow::Result<Engine> {
    let config = load_config(args)?;
    let mut engine = Engine::new(config);
    let surface = engine.initialize(None, None)?;
    info!(width = surface.width, height = surface.height, "surface ready");

    engine.add_plugin(InputPlugin::new());
    engine.add_plugin(OrbitControls::new().with_damping(0.1));
    engine.add_plugin(demo::SpinSystem);
    engine.add_plugin(demo::DemoSetup);
    Ok(engine)
}

/// Deliver `args.frames` host frames. Returns the number of hook failures.
fn simulate(engine: &mut Engine, args: &SceneArgs) -> anyhow::Result<usize> {
    engine.start();
    let mut failures = 0;
    for frame in 0..args.frames {
        if args.orbit {
            if frame == 0 {
                InputPlugin::send(engine, InputEvent::ButtonDown(Button::Primary));
            }
            let x = frame as f32 * 4.0;
            InputPlugin::send(engine, InputEvent::PointerMove { x, y: 0.0 });
        }
        if let Some(report) = engine.frame()? {
            failures += report.failures.len();
        }
    }
    engine.stop();
    Ok(failures)
}
