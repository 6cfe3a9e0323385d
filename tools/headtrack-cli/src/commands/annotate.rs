//! Interactive head-position annotation of the windows after each cue.

use std::io::{self, BufRead};
use std::path::PathBuf;

use headtrack_annotator::input::HELP;
use headtrack_annotator::{run_session, AnnotationSession, SessionObserver, TerminalRenderer};
use headtrack_audio::wav::AudioTrack;
use headtrack_audio::CueDetector;
use headtrack_common::clock::FrameClock;
use headtrack_common::config::AppConfig;
use headtrack_model::annotation::{AnnotationFile, PointStore, WindowPlacement};
use headtrack_model::coords::CoordinateTable;
use headtrack_processing::SegmentExtractor;

pub struct AnnotateArgs {
    pub audio: PathBuf,
    pub coords: PathBuf,
    pub fps: f64,
    pub frames: usize,
    pub output: PathBuf,
    pub resume: bool,
    pub source: Option<String>,
}

pub fn run(config: AppConfig, args: AnnotateArgs) -> anyhow::Result<()> {
    let stdin = io::stdin();
    annotate(&config, &args, stdin.lock(), io::stdout())
}

fn annotate<R: BufRead, W: io::Write>(
    config: &AppConfig,
    args: &AnnotateArgs,
    input: R,
    mut out: W,
) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let clock = FrameClock::new(args.fps)
        .ok_or_else(|| anyhow::anyhow!("Invalid frame rate: {}", args.fps))?;

    if args.output.exists() && !args.resume {
        anyhow::bail!(
            "{} already exists; pass --resume to continue it",
            args.output.display()
        );
    }

    writeln!(out, "Reading audio: {}", args.audio.display())?;
    let track =
        AudioTrack::load(&args.audio).map_err(|e| anyhow::anyhow!("Failed to read audio: {e}"))?;
    let cues = CueDetector::new(config.cues.clone())
        .detect(&track, clock)
        .map_err(|e| anyhow::anyhow!("Cue detection failed: {e}"))?;
    writeln!(out, "  Cue onsets (frames): {cues:?}")?;

    writeln!(out, "Reading tracking: {}", args.coords.display())?;
    let table = CoordinateTable::load(&args.coords)
        .map_err(|e| anyhow::anyhow!("Failed to read tracking data: {e}"))?;
    let centers = table.centers(config.tracking.confidence);

    let frames: Vec<u64> = (0..args.frames as u64).collect();
    let segments = SegmentExtractor::new(config.extraction.clone())
        .extract(&cues, clock, &frames, &centers)
        .map_err(|e| anyhow::anyhow!("Failed to extract segments: {e}"))?;

    let shape: Vec<usize> = segments.iter().map(|s| s.frames.len()).collect();
    let windows: Vec<WindowPlacement> = segments
        .iter()
        .map(|s| WindowPlacement {
            cue_frame: s.window.cue_frame,
            start_frame: s.window.start_frame,
        })
        .collect();
    for s in &segments {
        writeln!(
            out,
            "  Segment {}: frames {}..{}",
            s.window.index + 1,
            s.window.start_frame,
            s.window.end_frame
        )?;
    }

    let store = if args.resume && args.output.exists() {
        let previous = AnnotationFile::load(&args.output)
            .map_err(|e| anyhow::anyhow!("Failed to load annotations: {e}"))?;
        let store = previous
            .store_with_shape(&shape)
            .map_err(|e| anyhow::anyhow!("Cannot resume: {e}"))?;
        writeln!(out, "Resuming with {} marked frames", store.marked_count())?;
        store
    } else {
        PointStore::new(&shape)
    };

    let mut session = AnnotationSession::with_store(store)
        .map_err(|e| anyhow::anyhow!("Cannot start annotation: {e}"))?;

    writeln!(out, "\n{HELP}\n")?;
    let reference = segments.into_iter().map(|s| s.rows).collect();
    let mut renderer = TerminalRenderer::new(&mut out, reference);
    let mut messages = io::stderr();
    let outcome = {
        let observers: &mut [&mut dyn SessionObserver] = &mut [&mut renderer];
        run_session(&mut session, input, &mut messages, observers)
    };
    drop(renderer);

    let source = args.source.clone().unwrap_or_else(|| {
        args.audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    AnnotationFile::from_store(source, args.fps, &windows, session.store())
        .and_then(|file| file.save(&args.output))
        .map_err(|e| anyhow::anyhow!("Failed to save annotations: {e}"))?;
    writeln!(out, "Saved annotations to {}", args.output.display())?;

    outcome.map_err(|e| anyhow::anyhow!("Annotation session failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use headtrack_audio::wav::encode_pcm16;
    use headtrack_model::point::Point2D;

    const SAMPLE_RATE: u32 = 1_000;
    const FPS: f64 = 10.0;

    /// Seven half-second tones, 10 s apart from 2 s.
    fn write_audio(path: &std::path::Path) {
        let mut samples = vec![0.0f32; SAMPLE_RATE as usize * 80];
        for k in 0..7 {
            let start = SAMPLE_RATE as usize * (2 + 10 * k);
            for (i, s) in samples[start..start + 500].iter_mut().enumerate() {
                *s = if i % 2 == 0 { 0.5 } else { -0.5 };
            }
        }
        let track = AudioTrack {
            sample_rate: SAMPLE_RATE,
            channels: vec![samples],
        };
        std::fs::write(path, encode_pcm16(&track)).unwrap();
    }

    fn write_coords(path: &std::path::Path, rows: usize) {
        let mut text = String::from(
            "scorer,net,net,net\nbodyparts,nose,nose,nose\ncoords,x,y,likelihood\n",
        );
        for frame in 0..rows {
            text.push_str(&format!("{frame},{frame}.0,5.0,0.99\n"));
        }
        std::fs::write(path, text).unwrap();
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.cues.min_gap_frames = 5;
        config.extraction.offset_secs = 1.0;
        config.extraction.duration_secs = 0.3;
        config
    }

    #[test]
    fn test_annotate_saves_marked_points() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnnotateArgs {
            audio: dir.path().join("trial.wav"),
            coords: dir.path().join("trial.csv"),
            fps: FPS,
            frames: 800,
            output: dir.path().join("out").join("annotations.json"),
            resume: false,
            source: None,
        };
        write_audio(&args.audio);
        write_coords(&args.coords, 800);

        let mut out = Vec::new();
        annotate(&config(), &args, "m 1 2\nm 3 4\nq\n".as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("tracked (30.0, 5.0)"));

        let saved = AnnotationFile::load(&args.output).unwrap();
        assert_eq!(saved.source, "trial");
        assert_eq!(saved.segments.len(), 5);
        assert_eq!(saved.segments[0].cue_frame, 20);
        assert_eq!(saved.segments[0].start_frame, 30);
        assert_eq!(saved.segments[0].points.len(), 3);
        assert_eq!(saved.segments[0].points[1], Some(Point2D::new(3.0, 4.0)));

        // A second run without --resume refuses to overwrite.
        let err = annotate(&config(), &args, "q\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("--resume"));
    }

    #[test]
    fn test_garbled_input_line_keeps_marks() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnnotateArgs {
            audio: dir.path().join("trial.wav"),
            coords: dir.path().join("trial.csv"),
            fps: FPS,
            frames: 800,
            output: dir.path().join("annotations.json"),
            resume: false,
            source: None,
        };
        write_audio(&args.audio);
        write_coords(&args.coords, 800);

        let script: &[u8] = b"m 1 2\n\xff\xfe\nm 3 4\nq\n";
        annotate(&config(), &args, script, Vec::new()).unwrap();

        let saved = AnnotationFile::load(&args.output).unwrap();
        assert_eq!(saved.segments[0].points[0], Some(Point2D::new(1.0, 2.0)));
        assert_eq!(saved.segments[0].points[1], Some(Point2D::new(3.0, 4.0)));
    }

    #[test]
    fn test_window_past_the_video_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let args = AnnotateArgs {
            audio: dir.path().join("trial.wav"),
            coords: dir.path().join("trial.csv"),
            fps: FPS,
            frames: 300,
            output: dir.path().join("annotations.json"),
            resume: false,
            source: Some("short".to_string()),
        };
        write_audio(&args.audio);
        write_coords(&args.coords, 800);

        let err = annotate(&config(), &args, "q\n".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to extract segments"));
        assert!(!args.output.exists());
    }
}
