mod script;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use engine::audio::AudioClip;
use engine::headless::{
    HeadlessChannel, HeadlessClock, HeadlessPanel, HeadlessQuit, HeadlessSceneLoader,
    HeadlessToggle, HeadlessVideo, Journal,
};
use engine::lifecycle::{QuitStrategy, StopSimulation, Terminate};
use engine::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use menu::controls::ControlKind;
use menu::panels::{MenuContext, Panel};
use menu::preferences::PreferenceStore;
use menu::{MenuConfig, MenuController, MenuHost};
use script::{Step, parse_script, parse_step};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "menuctl")]
#[command(about = "Inspect menu preferences and run scripted headless menu sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show, change or reset the stored audio preferences.
    Prefs {
        /// Preference file. Defaults to the per-user location.
        #[arg(long)]
        path: Option<PathBuf>,
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Print a config preset as JSON.
    Config {
        #[arg(long, value_enum, default_value_t = ContextArg::MainMenu)]
        context: ContextArg,
    },
    /// Drive a headless menu with a script and print every host effect as a JSON line.
    Simulate {
        /// Config file. Defaults to the preset for `--context`.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ContextArg::MainMenu)]
        context: ContextArg,
        /// Script file, or `-` for stdin.
        #[arg(long)]
        script: Option<PathBuf>,
        /// Inline step such as `click open_settings`. Runs after the script.
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Preference file. Defaults to the per-user location.
        #[arg(long)]
        prefs: Option<PathBuf>,
        /// Keep preferences in memory only.
        #[arg(long, default_value_t = false)]
        ephemeral: bool,
        #[arg(long, value_enum, default_value_t = QuitArg::StopSimulation)]
        on_quit: QuitArg,
        /// Play hover and click cues on the default audio device.
        #[cfg(feature = "audio")]
        #[arg(long, default_value_t = false)]
        speakers: bool,
        #[cfg(feature = "audio")]
        #[arg(long)]
        hover_clip: Option<PathBuf>,
        #[cfg(feature = "audio")]
        #[arg(long)]
        click_clip: Option<PathBuf>,
        /// Looped on the music channel; muted while music is disabled.
        #[cfg(feature = "audio")]
        #[arg(long)]
        music_clip: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum PrefsAction {
    Show,
    Set {
        #[arg(value_enum)]
        channel: ChannelArg,
        #[arg(value_enum)]
        state: SwitchArg,
    },
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContextArg {
    MainMenu,
    InGame,
}

impl From<ContextArg> for MenuContext {
    fn from(value: ContextArg) -> Self {
        match value {
            ContextArg::MainMenu => MenuContext::MainMenu,
            ContextArg::InGame => MenuContext::InGame,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Sfx,
    Music,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SwitchArg {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QuitArg {
    ExitProcess,
    StopSimulation,
}

impl From<QuitArg> for QuitStrategy {
    fn from(value: QuitArg) -> Self {
        match value {
            QuitArg::ExitProcess => QuitStrategy::ExitProcess,
            QuitArg::StopSimulation => QuitStrategy::StopSimulation,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prefs { path, action } => cmd_prefs(path, action),
        Commands::Config { context } => cmd_config(context.into()),
        Commands::Simulate {
            config,
            context,
            script,
            steps,
            prefs,
            ephemeral,
            on_quit,
            #[cfg(feature = "audio")]
            speakers,
            #[cfg(feature = "audio")]
            hover_clip,
            #[cfg(feature = "audio")]
            click_clip,
            #[cfg(feature = "audio")]
            music_clip,
        } => {
            let session = Session {
                config: load_config(config.as_deref(), context.into())?,
                steps: load_steps(script.as_deref(), &steps)?,
            };
            #[cfg(feature = "audio")]
            let speakers = speakers.then_some(Speakers {
                hover_clip,
                click_clip,
                music_clip,
            });
            #[cfg(not(feature = "audio"))]
            let speakers = None;

            let mut out = io::stdout().lock();
            let summary = if ephemeral {
                session.run(MemoryStore::new(), speakers, &mut out)?
            } else {
                session.run(open_prefs(prefs), speakers, &mut out)?
            };
            out.flush()?;

            // The summary is out before a process-exit strategy gets to run.
            if summary.quit {
                QuitStrategy::from(on_quit).build(&StopSimulation::new()).quit();
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn open_prefs(path: Option<PathBuf>) -> JsonFileStore {
    match path {
        Some(path) => JsonFileStore::open(path),
        None => JsonFileStore::from_env(),
    }
}

fn cmd_prefs(path: Option<PathBuf>, action: PrefsAction) -> Result<()> {
    let store = open_prefs(path);
    let location = store.path().to_path_buf();
    let mut prefs = PreferenceStore::new(store);

    match action {
        PrefsAction::Show => {}
        PrefsAction::Set { channel, state } => {
            let enabled = matches!(state, SwitchArg::On);
            match channel {
                ChannelArg::Sfx => prefs.set_sfx_enabled(enabled),
                ChannelArg::Music => prefs.set_music_enabled(enabled),
            }
            ensure_durable(&location, &prefs)?;
        }
        PrefsAction::Reset => {
            prefs.reset();
            ensure_durable(&location, &prefs)?;
        }
    }

    let current = prefs.current();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "path": location.display().to_string(),
            "sfx_enabled": current.sfx_enabled,
            "music_enabled": current.music_enabled,
        }))?
    );
    Ok(())
}

/// The preference adapter swallows write failures; the CLI re-reads the file so a failed write
/// still exits non-zero.
fn ensure_durable(location: &Path, prefs: &PreferenceStore<JsonFileStore>) -> Result<()> {
    let reread = PreferenceStore::new(JsonFileStore::open(location)).current();
    if reread != prefs.current() {
        bail!("preferences were not written to {}", location.display());
    }
    Ok(())
}

fn cmd_config(context: MenuContext) -> Result<()> {
    let config = MenuConfig::preset(context);
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

fn load_config(path: Option<&Path>, context: MenuContext) -> Result<MenuConfig> {
    match path {
        Some(path) => MenuConfig::load(path)
            .with_context(|| format!("Failed to load menu config {}", path.display())),
        None => Ok(MenuConfig::preset(context)),
    }
}

fn load_steps(script: Option<&Path>, inline: &[String]) -> Result<Vec<Step>> {
    let mut steps = match script {
        Some(path) if path == Path::new("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            parse_script(&text)?
        }
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            parse_script(&text).with_context(|| format!("In script {}", path.display()))?
        }
        None => Vec::new(),
    };
    for raw in inline {
        steps.push(parse_step(raw).with_context(|| format!("In --step `{raw}`"))?);
    }
    Ok(steps)
}

#[cfg(feature = "audio")]
const MUSIC_VOLUME: f32 = 0.35;

#[cfg(feature = "audio")]
struct Speakers {
    hover_clip: Option<PathBuf>,
    click_clip: Option<PathBuf>,
    music_clip: Option<PathBuf>,
}

#[cfg(not(feature = "audio"))]
enum Speakers {}

struct Session {
    config: MenuConfig,
    steps: Vec<Step>,
}

#[derive(Debug, Serialize)]
struct Summary {
    context: MenuContext,
    active_panel: Panel,
    sfx_enabled: bool,
    music_enabled: bool,
    time_scale: Option<f32>,
    scenes_loaded: Vec<usize>,
    quit: bool,
    steps_run: usize,
    steps_total: usize,
}

/// Records the quit in the journal and stops the script. The configured strategy runs only
/// after the summary is written.
struct JournaledQuit {
    record: HeadlessQuit,
    stop: StopSimulation,
}

impl Terminate for JournaledQuit {
    fn quit(&mut self) {
        self.record.quit();
        self.stop.quit();
    }
}

impl Session {
    fn run<S: KeyValueStore>(
        self,
        store: S,
        speakers: Option<Speakers>,
        out: &mut impl Write,
    ) -> Result<Summary> {
        let journal = Journal::new();
        let stop = StopSimulation::new();
        let mut host = headless_host(&self.config, &journal);
        host.terminate = Some(Box::new(JournaledQuit {
            record: HeadlessQuit::new(&journal),
            stop: stop.clone(),
        }));

        #[cfg(feature = "audio")]
        let _stream = match speakers {
            Some(speakers) => Some(attach_speakers(&mut host, &speakers)?),
            None => None,
        };
        #[cfg(not(feature = "audio"))]
        let _ = speakers;

        let mut controller = MenuController::new(self.config, store, host);
        controller.initialize();
        let mut printed = print_events(out, &journal, 0)?;

        let steps_total = self.steps.len();
        let mut steps_run = 0;
        for step in &self.steps {
            if stop.is_stopped() {
                tracing::info!(remaining = steps_total - steps_run, "simulation stopped");
                break;
            }
            let dispatch = controller.handle(step.event());
            tracing::debug!(?step, ?dispatch, "step");
            printed = print_events(out, &journal, printed)?;
            steps_run += 1;
        }

        let prefs = controller.preferences();
        let summary = Summary {
            context: controller.context(),
            active_panel: controller.active_panel(),
            sfx_enabled: prefs.sfx_enabled,
            music_enabled: prefs.music_enabled,
            time_scale: controller.time_scale(),
            scenes_loaded: journal.scenes_loaded(),
            quit: journal.quit_count() > 0,
            steps_run,
            steps_total,
        };
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
        Ok(summary)
    }
}

fn headless_host(config: &MenuConfig, journal: &Journal) -> MenuHost {
    let mut host = MenuHost::new()
        .with_sfx_channel(HeadlessChannel::new("sfx", journal))
        .with_music_channel(HeadlessChannel::new("music", journal))
        .with_clips(Some(AudioClip::named("hover")), Some(AudioClip::named("click")))
        .with_scene_loader(HeadlessSceneLoader::new(journal))
        .with_time(HeadlessClock::new(journal));

    for &panel in config.context.panels() {
        host = host.with_panel(panel, HeadlessPanel::new(panel.name(), journal));
    }
    for row in config
        .controls
        .iter()
        .filter(|row| row.kind == ControlKind::Toggle)
    {
        let control = row.control.as_str();
        host = host.with_toggle(control, HeadlessToggle::new(control, journal));
    }
    if config.background.is_some() {
        host = host
            .with_static_background(HeadlessPanel::new("Backdrop", journal))
            .with_background_video(HeadlessVideo::new("video", journal));
    }
    host
}

#[cfg(feature = "audio")]
fn attach_speakers(host: &mut MenuHost, speakers: &Speakers) -> Result<engine::audio::OutputStream> {
    use engine::audio::{RodioChannel, open_default_output};

    let (stream, handle) = open_default_output().context("Failed to open audio output")?;
    let load = |path: &Option<PathBuf>| -> Result<Option<AudioClip>> {
        path.as_deref()
            .map(|path| {
                AudioClip::from_file(path)
                    .with_context(|| format!("Failed to read clip {}", path.display()))
            })
            .transpose()
    };
    host.hover_clip = load(&speakers.hover_clip)?;
    host.click_clip = load(&speakers.click_clip)?;
    if let Some(music_clip) = load(&speakers.music_clip)? {
        let mut music = RodioChannel::new(handle.clone()).with_volume(MUSIC_VOLUME);
        music
            .play_looping(&music_clip)
            .context("Failed to start music loop")?;
        host.music_channel = Some(Box::new(music));
    }
    host.sfx_channel = Some(Box::new(RodioChannel::new(handle)));
    Ok(stream)
}

fn print_events(out: &mut impl Write, journal: &Journal, from: usize) -> Result<usize> {
    let events = journal.since(from);
    for event in &events {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    Ok(from + events.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu::preferences::SFX_ENABLED_KEY;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("menuctl_{tag}_{}_{ts}", std::process::id()))
    }

    fn session(context: MenuContext, script: &str) -> Session {
        Session {
            config: MenuConfig::preset(context),
            steps: parse_script(script).expect("script should parse"),
        }
    }

    fn output_lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).expect("every line is JSON"))
            .collect()
    }

    #[test]
    fn quit_stops_the_script_early() {
        let mut out = Vec::new();
        let summary = session(
            MenuContext::MainMenu,
            "click open_settings\nclick quit\nclick close_settings\n",
        )
        .run(MemoryStore::new(), None, &mut out)
        .expect("session should run");

        assert!(summary.quit);
        assert_eq!(summary.steps_run, 2);
        assert!(summary.steps_run < summary.steps_total);
        assert_eq!(summary.active_panel, Panel::Settings);

        let lines = output_lines(&out);
        assert!(lines.iter().any(|line| line["event"] == "quit"));
        let last = lines.last().expect("summary line");
        assert_eq!(last["steps_run"], 2);
        assert_eq!(last["quit"], true);
    }

    #[test]
    fn summary_is_written_before_any_exit_strategy_runs() {
        let mut out = Vec::new();
        let summary = session(MenuContext::InGame, "click pause\nclick menu\nclick resume\n")
            .run(MemoryStore::new(), None, &mut out)
            .expect("session should run");

        assert!(!summary.quit);
        assert_eq!(summary.steps_run, 3);
        assert_eq!(summary.scenes_loaded, vec![0]);
        assert_eq!(summary.time_scale, Some(1.0));
        assert!(output_lines(&out).last().is_some_and(|line| line["steps_total"] == 3));
    }

    #[test]
    fn toggle_steps_persist_through_the_store() {
        let store = MemoryStore::new();
        let disk = store.clone();
        let mut out = Vec::new();
        let summary = session(MenuContext::MainMenu, "set sfx_toggle off\n")
            .run(store, None, &mut out)
            .expect("session should run");

        assert!(!summary.sfx_enabled);
        assert!(summary.music_enabled);
        assert_eq!(disk.durable_int(SFX_ENABLED_KEY), Some(0));
    }

    #[test]
    fn headless_host_attaches_one_toggle_per_toggle_row() {
        let journal = Journal::new();
        let title = headless_host(&MenuConfig::main_menu(1), &journal);
        assert_eq!(title.toggles.len(), 2);
        assert_eq!(title.panels.len(), 2);
        assert!(title.static_background.is_some());
        assert!(title.background_video.is_some());

        let overlay = headless_host(&MenuConfig::pause_menu(0), &journal);
        assert!(overlay.toggles.is_empty());
        assert!(overlay.static_background.is_none());
        assert!(overlay.background_video.is_none());
    }

    #[test]
    fn ensure_durable_accepts_written_prefs_and_rejects_lost_writes() {
        let root = temp_dir("durable");
        let path = root.join("prefs.json");
        let mut prefs = PreferenceStore::new(JsonFileStore::open(&path));
        prefs.set_music_enabled(false);
        assert!(ensure_durable(&path, &prefs).is_ok());

        // A file where the parent directory should be makes every save fail.
        fs::create_dir_all(&root).expect("create temp root");
        let blocker = root.join("blocker");
        fs::write(&blocker, b"").expect("create blocker file");
        let lost = blocker.join("prefs.json");
        let mut prefs = PreferenceStore::new(JsonFileStore::open(&lost));
        prefs.set_sfx_enabled(false);
        assert!(ensure_durable(&lost, &prefs).is_err());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn simulate_defaults_to_stopping_the_simulation() {
        let cli = Cli::try_parse_from(["menuctl", "simulate", "--step", "click quit"])
            .expect("arguments should parse");
        let Commands::Simulate { on_quit, steps, .. } = cli.command else {
            panic!("expected simulate");
        };
        assert!(matches!(on_quit, QuitArg::StopSimulation));
        assert_eq!(steps, vec!["click quit".to_string()]);
    }

    #[cfg(feature = "audio")]
    #[test]
    fn speakers_accept_a_music_clip() {
        let cli = Cli::try_parse_from([
            "menuctl",
            "simulate",
            "--speakers",
            "--music-clip",
            "menu_theme.ogg",
        ])
        .expect("arguments should parse");
        let Commands::Simulate {
            speakers,
            music_clip,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert!(speakers);
        assert_eq!(music_clip, Some(PathBuf::from("menu_theme.ogg")));
    }
}
