use clap::{Parser, Subcommand};
use jianpu::engrave::{beam_groups, measure_lyrics, render_text};
use jianpu::sync::{SyncController, SyncEvent, SyncListener};
use jianpu::{JianpuError, Layout, SimulatedTransport, Song, Tempo, Transport};
use log::{info, warn};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::process;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "jianpu")]
#[command(about = "Jianpu notation layout and playback synchronization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the embedded song catalog
    List,

    /// Print a song as jianpu text
    Show {
        /// Catalog name or path to a YAML song document
        song: String,

        /// Override the song's tempo (BPM)
        #[arg(long)]
        tempo: Option<f64>,

        /// Measures per printed line
        #[arg(long, default_value_t = 4)]
        per_line: usize,

        /// Also print the audio triggers (tied notes merged)
        #[arg(long)]
        audio: bool,

        /// Print the layout as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Simulate playback and print the highlight notifications
    Play {
        /// Catalog name or path to a YAML song document
        song: String,

        /// Override the song's tempo (BPM)
        #[arg(long)]
        tempo: Option<f64>,

        /// Ticks per second
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,

        /// Sleep between ticks so playback runs at wall-clock speed
        #[arg(long)]
        realtime: bool,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },
}

/// Prints sync notifications as they arrive
struct Printer {
    json: bool,
    clock: Rc<Cell<f64>>,
    layout: Option<Arc<Layout>>,
}

impl SyncListener for Printer {
    fn notify(&mut self, event: &SyncEvent) {
        if self.json {
            match serde_json::to_string(&JsonLine { seconds: self.clock.get(), event }) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("could not serialize event: {}", e),
            }
            return;
        }

        let seconds = self.clock.get();
        match event {
            SyncEvent::LayoutReady { layout } => {
                println!(
                    "layout: {} notes, {} measures, {:.2} s",
                    layout.notes().len(),
                    layout.measures().len(),
                    layout.timeline().total_seconds()
                );
                self.layout = Some(Arc::clone(layout));
            }
            SyncEvent::StateChanged { state } => println!("[{:8.3}] state {:?}", seconds, state),
            SyncEvent::MeasureChanged { measure_index } => {
                println!("[{:8.3}] measure {}", seconds, measure_index + 1)
            }
            SyncEvent::Highlight(h) => {
                let note = self.layout.as_ref().and_then(|l| l.notes().get(h.note_index));
                let pitch = note.map(|n| n.pitch().to_string()).unwrap_or_default();
                let lyric = note.and_then(|n| n.lyric()).unwrap_or("");
                println!(
                    "[{:8.3}]   note {:3} {:4} {} ({:.2})",
                    seconds, h.note_index, pitch, lyric, h.progress_within_note
                );
            }
            SyncEvent::Cleared => println!("[{:8.3}] cleared", seconds),
        }
    }
}

#[derive(serde::Serialize)]
struct JsonLine<'a> {
    seconds: f64,
    #[serde(flatten)]
    event: &'a SyncEvent,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Show {
            song,
            tempo,
            per_line,
            audio,
            json,
        } => show(&song, tempo, per_line, audio, json),
        Command::Play {
            song,
            tempo,
            fps,
            from,
            realtime,
            json,
        } => play(&song, tempo, fps, from, realtime, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn list() {
    for source in jianpu_scores::all_songs() {
        match Song::from_yaml(source.yaml) {
            Ok(song) => {
                let meta = song.metadata();
                println!(
                    "{:<16} {} - {} ({:?}, {}, {})",
                    source.name,
                    song.title(),
                    meta.artist.as_deref().unwrap_or("unknown"),
                    meta.difficulty,
                    meta.key.as_deref().unwrap_or("C"),
                    song.time_signature()
                );
            }
            Err(e) => eprintln!("{:<16} invalid: {}", source.name, e),
        }
    }
}

/// Load a song from a file path, falling back to the embedded catalog.
fn load_song(name: &str) -> Result<Song, String> {
    let path = Path::new(name);
    if path.is_file() {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("reading file '{}': {}", name, e))?;
        return Song::from_yaml(&source).map_err(|e| e.to_string());
    }

    let source = jianpu_scores::get_song(name)
        .ok_or_else(|| JianpuError::UnknownSong(name.to_string()).to_string())?;
    Song::from_yaml(source.yaml).map_err(|e| e.to_string())
}

fn layout_for(song: &Song, tempo: Option<f64>) -> Result<Layout, String> {
    let layout = Layout::from_song(song);
    let layout = match tempo {
        Some(bpm) => layout.with_tempo(Tempo::new(bpm).map_err(|e| e.to_string())?),
        None => layout,
    };
    for warning in layout.warnings() {
        eprintln!("warning: {}", warning);
    }
    Ok(layout)
}

fn show(name: &str, tempo: Option<f64>, per_line: usize, audio: bool, json: bool) -> Result<(), String> {
    let song = load_song(name)?;
    let layout = layout_for(&song, tempo)?;

    if json {
        let out = serde_json::to_string_pretty(&layout).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", song.title());
    if let Some(artist) = &song.metadata().artist {
        println!("{}", artist);
    }
    println!(
        "1={}  {}  {} BPM",
        song.metadata().key.as_deref().unwrap_or("C"),
        layout.time_signature(),
        layout.tempo().bpm()
    );
    println!();
    println!("{}", render_text(&layout, per_line));

    let lyrics: Vec<&str> = (0..layout.measures().len())
        .flat_map(|i| measure_lyrics(&layout, i))
        .collect();
    if !lyrics.is_empty() {
        println!();
        println!("{}", lyrics.join(" "));
    }

    let beams: usize = (0..layout.measures().len())
        .map(|i| beam_groups(&layout, i).len())
        .sum();
    println!();
    println!(
        "{} notes, {} measures, {} beam groups, {:.2} s",
        layout.notes().len(),
        layout.measures().len(),
        beams,
        layout.timeline().total_seconds()
    );

    if audio {
        println!();
        for event in layout.timeline().audio_events(layout.notes(), song.key()) {
            println!(
                "{:8.3}s  midi {:3}  {:.3}s  notes {:?}",
                event.start_seconds, event.midi_note, event.duration_seconds, event.note_indices
            );
        }
    }

    Ok(())
}

fn play(name: &str, tempo: Option<f64>, fps: u32, from: f64, realtime: bool, json: bool) -> Result<(), String> {
    let song = load_song(name)?;
    let layout = layout_for(&song, tempo)?;
    let total = layout.timeline().total_seconds();
    info!("playing '{}' ({:.2} s) at {} ticks/s", song.title(), total, fps);

    let frame = 1.0 / fps.max(1) as f64;
    let clock = Rc::new(Cell::new(from));
    let mut transport = SimulatedTransport::new();
    let mut controller = SyncController::new(layout);
    controller.subscribe(Printer {
        json,
        clock: Rc::clone(&clock),
        layout: None,
    });

    transport.seek(from);
    controller.seek(transport.current_seconds());
    transport.play();
    controller.play();

    while controller.wants_ticks() && transport.current_seconds() <= total + frame {
        clock.set(transport.current_seconds());
        controller.poll(&transport);
        if controller.current().is_finished() {
            break;
        }
        if realtime {
            thread::sleep(Duration::from_secs_f64(frame));
        }
        transport.advance(frame);
    }

    transport.reset();
    controller.reset();
    Ok(())
}
