use clap::{Parser, Subcommand};
use hand_gesture_pipeline::io::object_to_json;
use hand_gesture_pipeline::registry::{ChannelSubscriber, LogSubscriber};
use hand_gesture_pipeline::synthetic::HandSynthesizer;
use hand_gesture_pipeline::tracker::{RecordedTracker, save_recording};
use hand_gesture_pipeline::{
    ClassifierHandle, GestureEvent, GestureId, GesturePipeline, MlpClassifier, PipelineConfig,
    RunStats,
};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a landmark recording through the gesture pipeline
    Replay {
        /// Recording file, or folder of recordings
        path: String,

        /// Classifier model JSON
        #[arg(short, long)]
        model: String,

        /// Pipeline config JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Gesture ids to subscribe to, comma separated (default: every model class)
        #[arg(short, long, value_delimiter = ',')]
        subscribe: Vec<GestureId>,

        /// Write the fired events to this JSON file
        #[arg(short, long)]
        output: Option<String>,

        /// Save a rerun recording of landmarks and events (turns on debug)
        #[arg(long)]
        rerun: Option<String>,
    },
    /// Generate a synthetic landmark recording
    Synth {
        /// Output recording JSON
        #[arg(short, long)]
        output: String,

        /// Number of frames to generate
        #[arg(short, long, default_value = "300")]
        num_frames: usize,

        /// Frames each pose is held
        #[arg(long, default_value = "30")]
        segment_len: usize,

        /// Landmark noise in normalized frame units
        #[arg(long, default_value = "0.004")]
        jitter: f32,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "480")]
        height: u32,
    },
}

#[derive(Serialize)]
struct ReplayReport {
    stats: RunStats,
    events: Vec<GestureEvent>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Replay {
            path,
            model,
            config,
            subscribe,
            output,
            rerun,
        } => replay(&path, &model, config.as_deref(), subscribe, output.as_deref(), rerun.as_deref()),
        Commands::Synth {
            output,
            num_frames,
            segment_len,
            jitter,
            seed,
            width,
            height,
        } => {
            if !jitter.is_finite() {
                log::warn!("jitter {} is not finite, generating without noise", jitter);
            }
            let frames =
                HandSynthesizer::new(seed, jitter).recording(num_frames, (width, height), segment_len);
            save_recording(Path::new(&output), &frames)?;
            println!("Generated {} frames in {}", frames.len(), output);
            Ok(())
        }
    }
}

fn replay(
    path: &str,
    model_path: &str,
    config_path: Option<&str>,
    subscribe: Vec<GestureId>,
    output: Option<&str>,
    rerun_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(p) => PipelineConfig::from_json_file(Path::new(p))?,
        None => PipelineConfig::default(),
    };
    config.debug |= rerun_path.is_some();

    let model = MlpClassifier::from_json_file(Path::new(model_path))?;
    let gesture_ids: Vec<GestureId> = if subscribe.is_empty() {
        (0..model.num_classes() as GestureId).collect()
    } else {
        subscribe
    };
    let classifier = Arc::new(ClassifierHandle::with_classifier(Arc::new(model)));

    let mut pipeline = GesturePipeline::new(config, classifier)?;
    if let Some(rrd) = rerun_path {
        let recording = rerun::RecordingStreamBuilder::new("gesture-replay").save(rrd)?;
        pipeline = pipeline.with_recording(recording);
    }

    let (tx, rx) = mpsc::channel();
    pipeline.subscribe(gesture_ids.iter().copied(), "log", Arc::new(LogSubscriber::new("replay")));
    pipeline.subscribe(gesture_ids, "report", Arc::new(ChannelSubscriber::new(tx)));

    let mut tracker = RecordedTracker::open(Path::new(path))?;
    let now = Instant::now();
    let stats = pipeline.run(&mut tracker);
    let duration_sec = now.elapsed().as_secs_f64();
    println!(
        "replayed {} frames in {:.6} sec, {} gesture event(s)",
        stats.frames, duration_sec, stats.events
    );
    if stats.frames > 0 {
        println!("avg: {} sec", duration_sec / stats.frames as f64);
    }

    let events: Vec<GestureEvent> = rx.try_iter().collect();
    if let Some(output) = output {
        let report = ReplayReport { stats, events };
        object_to_json::<_, Box<dyn std::error::Error>>(Path::new(output), &report)?;
    }
    Ok(())
}
