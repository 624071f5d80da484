use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rodio::{source::SineWave, OutputStream, Sink, Source};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventOutcome, RenderContext,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};
use tracing_subscriber::EnvFilter;

use bramble::action::Action;
use bramble::effect::{Effect, SoundCue};
use bramble::map::MapState;
use bramble::reducer::reducer;
use bramble::state::AppState;
use bramble::ui;

const TICK_MS: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "bramble")]
#[command(about = "A trail-and-thicket adventure TUI")]
struct Args {
    /// Load an overworld map from a character-grid file instead of the
    /// builtin trail.
    #[arg(long)]
    map: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let debug = DebugSession::new(args.debug);
    init_tracing(!debug.use_alt_screen());

    let initial = match args.map.as_deref() {
        Some(path) => {
            let map = MapState::load(path)
                .map_err(|error| io::Error::other(format!("map error: {error}")))?;
            AppState::with_map(map)
        }
        None => AppState::new(),
    };

    let state = debug
        .load_state_or_else_async(|| async move { Ok::<AppState, io::Error>(initial) })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

/// Logging goes to stderr only when the alternate screen is off (headless
/// debug runs), or to the file named by BRAMBLE_LOG.
fn init_tracing(headless: bool) {
    if let Ok(path) = std::env::var("BRAMBLE_LOG") {
        if let Ok(file) = std::fs::File::create(&path) {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
            return;
        }
    }
    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    debug
        .run_effect_app(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            |frame, area, state, render_ctx: RenderContext| {
                ui::render(frame, area, state, render_ctx);
            },
            |event, state| -> EventOutcome<Action> { ui::handle_event(event, state) },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, _ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::PlaySound(cue) => play_cue(cue),
    }
}

fn play_cue(cue: SoundCue) {
    let (freq, millis) = match cue {
        SoundCue::Encounter => (330.0, 240),
        SoundCue::Attack => (640.0, 140),
        SoundCue::Victory => (880.0, 320),
    };
    std::thread::spawn(move || {
        let Ok((stream, handle)) = OutputStream::try_default() else {
            return;
        };
        let Ok(sink) = Sink::try_new(&handle) else {
            return;
        };
        let source = SineWave::new(freq)
            .take_duration(Duration::from_millis(millis))
            .amplify(0.18);
        sink.append(source);
        sink.sleep_until_end();
        drop(stream);
    });
}
