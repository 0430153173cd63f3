//! pet-runner: headless host for the mermaid core.
//!
//! Usage:
//!   pet-runner --db mermaid.db --seconds 30 --time-scale 600
//!   pet-runner --db mermaid.db --ipc-mode

use anyhow::Result;
use mermaid_core::{
    clock::SystemClock,
    collaborator::{Collaborators, LogNotifier, LogPresenter},
    command::PetCommand,
    config::PetConfig,
    engine::PetEngine,
    event::{event_type_name, PetEvent},
    store::PetStore,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: PetCommand },
    Suspend,
    Resume,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seconds = parse_arg(&args, "--seconds", 5u64);
    let time_scale = parse_arg(&args, "--time-scale", 0.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("mermaid.db");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let mut config = PetConfig::load(data_dir)?;
    if time_scale > 0.0 {
        config.time.time_scale = time_scale;
    }

    if !ipc_mode {
        println!("Mermaid pet-runner");
        println!("  db:          {db}");
        println!("  data_dir:    {data_dir}");
        println!("  seconds:     {seconds}");
        println!("  time scale:  {}x", config.time.time_scale);
        println!();
    }

    let store = PetStore::open(db)?;
    let collaborators = Collaborators::none()
        .with_notifications(Box::new(LogNotifier))
        .with_presentation(Box::new(LogPresenter));
    let mut engine = PetEngine::open(config, store, Box::new(SystemClock), collaborators)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let mut events = engine.on_resume()?;
        events.extend(engine.run_for(Duration::from_secs(seconds))?);
        events.extend(engine.on_suspend()?);
        print_summary(&engine, &events);
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut PetEngine) -> Result<()> {
    // Stdin is read on its own thread so live ticks keep flowing between lines.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut stdout = io::stdout();
    engine.on_resume()?;
    let poll = engine.config().tick_interval();

    loop {
        let line = match line_rx.recv_timeout(poll) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => {
                engine.pump()?;
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break, // EOF
        };
        engine.pump()?;
        if line.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Command { command } => {
                if let Err(e) = engine.apply(command) {
                    log::warn!("command failed: {e}");
                }
            }
            IpcCommand::Suspend => {
                engine.on_suspend()?;
            }
            IpcCommand::Resume => {
                engine.on_resume()?;
            }
        }
        writeln!(stdout, "{}", serde_json::to_string(&engine.snapshot())?)?;
        stdout.flush()?;
    }

    engine.on_suspend()?;
    Ok(())
}

fn print_summary(engine: &PetEngine, events: &[PetEvent]) {
    let pet = engine.snapshot();

    println!("=== PET SUMMARY ===");
    println!("  name:        {}", pet.name);
    println!("  life:        {:?}", pet.life);
    println!("  day:         {}", pet.days_passed);
    println!("  stage:       {}", pet.stage_label);
    println!("  size:        {:.1} cm", pet.size_cm);
    println!("  hunger:      {:.2}", pet.hunger);
    println!("  pollution:   {:.2}", pet.pollution);
    println!("  checkpoint:  {}", pet.last_checkpoint_time.to_rfc3339());

    println!();
    println!("=== EVENTS ===");
    let notable: Vec<_> = events
        .iter()
        .filter(|e| !matches!(e, PetEvent::DaysAdvanced { .. }))
        .collect();
    if notable.is_empty() {
        println!("  (nothing happened)");
    } else {
        for event in notable {
            println!("  {:<22} {}", event_type_name(event), serde_json::to_string(event).unwrap_or_default());
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
