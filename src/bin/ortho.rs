use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use ortho_wm::common::config::{Config, config_file};
use ortho_wm::common::log;
use ortho_wm::layout_engine::{Direction, LayoutEngine, LayoutEvent};
use ortho_wm::model::StackRole;
use ortho_wm::sys::geometry::{Insets, Rect};
use ortho_wm::sys::headless::HeadlessHost;
use ortho_wm::sys::host::{Host, WindowId, WorkspaceId};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Main/secondary stack tiling layout")]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check whether the configuration file loads and is valid, then exit.
    #[arg(long)]
    validate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out windows on a headless monitor and print their geometry as JSON.
    Simulate(SimulateArgs),
    /// Print the default configuration file.
    DefaultConfig,
}

#[derive(Args)]
struct SimulateArgs {
    #[arg(long, default_value_t = 1920.0)]
    width: f64,
    #[arg(long, default_value_t = 1080.0)]
    height: f64,

    /// Space reserved by bars along each monitor edge.
    #[arg(long, default_value_t = 0.0)]
    reserved_top: f64,
    #[arg(long, default_value_t = 0.0)]
    reserved_right: f64,
    #[arg(long, default_value_t = 0.0)]
    reserved_bottom: f64,
    #[arg(long, default_value_t = 0.0)]
    reserved_left: f64,

    /// Number of windows to open, in order.
    #[arg(long, default_value_t = 3)]
    windows: usize,

    /// Layout message to send after opening the windows, e.g.
    /// "adjustweight exact 2". May be repeated.
    #[arg(long = "message", value_name = "MESSAGE")]
    messages: Vec<String>,

    /// Index of the window (in opening order, from 0) messages are sent to.
    #[arg(long, default_value_t = 0)]
    target: usize,

    /// Move the target window toward a neighbor after the messages are sent.
    /// Accepts left/right/up/down or l/r/u/d.
    #[arg(long = "move", value_name = "DIRECTION")]
    move_to: Option<Direction>,

    /// Jump windows to their new geometry instead of animating.
    #[arg(long)]
    force_warps: bool,

    /// Also print the stacks as a tree on stderr.
    #[arg(long)]
    draw: bool,
}

#[derive(Serialize)]
struct SimulatedWindow {
    id: WindowId,
    stack: &'static str,
    weight: f64,
    rect: Option<Rect>,
}

#[derive(Serialize)]
struct Simulation {
    layout: &'static str,
    workspace: WorkspaceId,
    windows: Vec<SimulatedWindow>,
}

const SIMULATED_WORKSPACE: WorkspaceId = WorkspaceId::new(1);

fn main() -> anyhow::Result<()> {
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);

    if opt.validate {
        let config = match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e:#}");
                process::exit(1);
            }
        };
        let issues = config.validate();
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{issue}");
            }
            process::exit(1);
        }
        return Ok(());
    }

    let config = if config_path.exists() {
        Config::read(&config_path)?
    } else {
        Config::default()
    };

    match opt.command {
        Some(Commands::Simulate(args)) => simulate(&config, &args),
        Some(Commands::DefaultConfig) => {
            let text = toml::to_string_pretty(&Config::default())
                .context("Failed to serialize the default configuration")?;
            print!("{text}");
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn simulate(config: &Config, args: &SimulateArgs) -> anyhow::Result<()> {
    for issue in config.validate() {
        tracing::warn!("{issue}");
    }
    if args.windows > 0 && args.target >= args.windows {
        bail!("--target {} is out of range for {} windows", args.target, args.windows);
    }

    let mut host = HeadlessHost::new();
    let reserved = Insets::new(
        args.reserved_top,
        args.reserved_right,
        args.reserved_bottom,
        args.reserved_left,
    );
    let monitor = host.add_monitor(Rect::from_xywh(0.0, 0.0, args.width, args.height), reserved);
    host.add_workspace(SIMULATED_WORKSPACE, monitor);

    let mut engine = LayoutEngine::new(&config.settings);
    engine.set_force_warps(args.force_warps);
    let _ = engine.enable(&mut host);

    let windows: Vec<WindowId> = (0..args.windows).map(|_| host.add_window(SIMULATED_WORKSPACE)).collect();
    for &wid in &windows {
        let _ = engine.handle_event(&mut host, LayoutEvent::WindowCreated(wid));
    }

    let target = windows.get(args.target).copied();
    for message in &args.messages {
        let response = engine.handle_message(&mut host, target, message);
        info!(msg = %message, recalculated = ?response.recalculated_monitors, "Sent layout message");
    }

    if let (Some(direction), Some(wid)) = (args.move_to, target) {
        let response = engine.handle_event(
            &mut host,
            LayoutEvent::MoveWindow { wid, direction, silent: false },
        );
        info!(%wid, %direction, recalculated = ?response.recalculated_monitors, "Moved window");
    }

    if args.draw {
        eprint!("{}", engine.draw_workspace(SIMULATED_WORKSPACE));
    }

    let describe = |role: StackRole| {
        let stack = match role {
            StackRole::Main => "main",
            StackRole::Secondary => "secondary",
        };
        engine
            .stacks()
            .stack(role, SIMULATED_WORKSPACE)
            .iter()
            .map(|node| SimulatedWindow {
                id: node.window,
                stack,
                weight: node.weight,
                rect: host.window_goal_geometry(node.window),
            })
            .collect::<Vec<_>>()
    };
    let mut simulated = describe(StackRole::Main);
    simulated.extend(describe(StackRole::Secondary));

    let out = Simulation {
        layout: engine.layout_name(),
        workspace: SIMULATED_WORKSPACE,
        windows: simulated,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
