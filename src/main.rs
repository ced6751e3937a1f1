use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

use clapworks::audio::LoopingTrack;
use clapworks::camera::SyntheticCamera;
use clapworks::classifier::{self, LatestLabel, PresenceClassifier};
use clapworks::config::{Cli, Settings};
use clapworks::effects::Effect;
use clapworks::effects::fireworks::FireworksEffect;

fn init_logging(path: &Path, verbose: bool) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

fn is_quit(event: &Event) -> bool {
    let Event::Key(key_event) = event else {
        return false;
    };
    key_event.code == KeyCode::Char('q')
        || key_event.code == KeyCode::Esc
        || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
}

fn run_effect<E: Effect>(effect: &mut E, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / 60.0;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                _ if is_quit(&event) => break,
                Event::Resize(cols, rows) => {
                    effect.resize(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => effect.handle_event(&event),
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        // One frame of the animation per tick
        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(stdout)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file, cli.verbose)?;
    let settings = Settings::from(&cli);
    info!(?settings, "starting");

    let camera_seed = settings.seed.map_or_else(|| fastrand::u32(..), |seed| seed as u32);
    let camera = Arc::new(SyntheticCamera::new(camera_seed));
    let label = LatestLabel::new();

    let publisher = label.clone();
    let mut inference = classifier::start(
        PresenceClassifier::new(settings.classify_interval),
        camera.clone(),
        move |result| publisher.publish(result),
    );

    let player = LoopingTrack::open(&cli.track);

    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());
    terminal::enable_raw_mode().context("enabling raw mode")?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = terminal::size().and_then(|(cols, rows)| {
        let mut effect = FireworksEffect::new(
            cols as usize,
            rows as usize * 2,
            &settings,
            camera,
            label,
            Box::new(player),
        );
        run_effect(&mut effect, &mut stdout)
    });

    execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal::disable_raw_mode()?;
    inference.stop();

    result.context("terminal loop failed")?;
    info!("bye");
    Ok(())
}
