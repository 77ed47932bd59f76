use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use padsim::io::midi::{self, MidiIn};
use padsim::prelude::*;

mod cli;
mod sink;

use cli::Cli;
use sink::OutputSink;

fn main() {
    init_logger();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("sysim failed: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if cli.list_ports {
        return midi::print_ports();
    }

    let interval = cli.interval.ok_or("interval parameter missing")?;
    let config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    info!(
        "Running with interval: {}s; hosts: {}; index: {}",
        interval, config.entities, cli.index
    );

    let (surface, _input) = open_surface(&cli, SystemClock::shared())?;
    let result = simulate(&cli, &config, &surface, interval);
    surface.shutdown();
    result
}

/// The input connection must outlive the run; dropping it closes the port.
fn open_surface(
    cli: &Cli,
    clock: SharedClock,
) -> Result<(ControlSurface, Option<MidiIn>), Box<dyn Error>> {
    if cli.simulate {
        info!("Simulating the surface; no hardware will be touched");
        let surface = ControlSurface::new(SimulatedTransport::new(), clock);
        return Ok((surface, None));
    }

    let MidiSurface { surface, input } = midi::connect(&cli.port, clock)?;
    Ok((surface, Some(input)))
}

fn simulate(
    cli: &Cli,
    config: &SimConfig,
    surface: &ControlSurface,
    interval: u64,
) -> Result<(), Box<dyn Error>> {
    surface.clear_all();
    surface.scroll_text(
        &cli.index,
        config.scroll_color(),
        config.scroll.duration(),
        config.scroll.speed,
    );

    let levels = Arc::new(config.level_table()?);
    let entities = (0..config.entities)
        .map(|ordinal| Entity::new(ordinal, surface, levels.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    let reserved = reserved_pads(config.entities)?;
    let _animation =
        AmbientAnimation::install(surface, &reserved, config.animation.clone());

    let sink = OutputSink::open(&cli.destination, &cli.index)?;
    info!("Writing documents to {}", sink.target(&cli.destination));
    let mut emitter = Emitter::new(entities, sink);

    let (commands, receiver) = command_channel();
    // Held so a closed stdin doesn't hang up the channel.
    let _keepalive = commands.clone();
    ctrlc::set_handler(quit_on_interrupt(commands.clone()))?;
    spawn_quit_on_enter(commands)?;
    eprintln!("Press Enter or Ctrl-C to stop");

    let count = cli.count;
    emitter.run(Duration::from_secs(interval), &receiver, |emitter, _| {
        if emitter.ticks() == 1 {
            print_sample(emitter.sink().sample());
        }
        print_status(&emitter.status_line());
        count.is_none_or(|count| emitter.ticks() < count)
    });
    eprintln!();

    Ok(())
}

/// Ctrl-C and SIGTERM end the run the same way Enter does, so the device
/// still gets reset.
fn quit_on_interrupt(
    commands: EmitterCommandSender,
) -> impl FnMut() + Send + 'static {
    move || {
        debug!("Interrupted");
        let _ = commands.send(EmitterCommand::Quit);
    }
}

fn spawn_quit_on_enter(commands: EmitterCommandSender) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) => debug!("stdin closed; waiting for --count or a kill"),
                Ok(_) => {
                    let _ = commands.send(EmitterCommand::Quit);
                }
                Err(err) => warn!("Unable to read stdin: {}", err),
            }
        })?;
    Ok(())
}

fn print_sample(sample: Option<&serde_json::Value>) {
    let Some(sample) = sample else {
        return;
    };
    match serde_json::to_string_pretty(sample) {
        Ok(pretty) => eprintln!("sample doc: {}\n", pretty),
        Err(err) => warn!("Unable to render sample doc: {}", err),
    }
}

/// Status goes to stderr so stdout stays clean NDJSON.
fn print_status(status: &str) {
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "\r{}", status);
    let _ = stderr.flush();
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn interrupt_stops_emitter() {
        let transport = SimulatedTransport::new();
        let surface = ControlSurface::new(transport, SystemClock::shared());
        let levels = Arc::new(LevelTable::default());
        let entity = Entity::new(0, &surface, levels).unwrap();
        let mut emitter = Emitter::new(vec![entity], VecSink::default());
        let (commands, receiver) = command_channel();

        let handle = thread::spawn(move || {
            emitter.run(Duration::from_secs(3600), &receiver, |_, _| true);
            emitter
        });

        let mut interrupt = quit_on_interrupt(commands.clone());
        interrupt();
        let emitter = handle.join().unwrap();

        assert_eq!(emitter.ticks(), 1);
        assert_eq!(emitter.docs_written(), 1);
    }
}
