//! Detect cue onsets in a soundtrack.

use std::path::PathBuf;

use headtrack_audio::envelope::envelope;
use headtrack_audio::wav::AudioTrack;
use headtrack_audio::CueDetector;
use headtrack_common::clock::FrameClock;
use headtrack_common::config::AppConfig;

pub fn run(
    mut config: AppConfig,
    audio: PathBuf,
    fps: f64,
    threshold: Option<f64>,
    min_gap: Option<u64>,
    expected: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(threshold) = threshold {
        config.cues.threshold = threshold;
    }
    if let Some(min_gap) = min_gap {
        config.cues.min_gap_frames = min_gap;
    }
    if let Some(expected) = expected {
        config.cues.expected_count = expected;
        config.extraction.segments = config.extraction.segments.min(expected);
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let clock =
        FrameClock::new(fps).ok_or_else(|| anyhow::anyhow!("Invalid frame rate: {fps}"))?;

    println!("Reading audio: {}", audio.display());
    let track =
        AudioTrack::load(&audio).map_err(|e| anyhow::anyhow!("Failed to read audio: {e}"))?;
    println!(
        "  {} channel(s), {} Hz, {:.1}s",
        track.channels.len(),
        track.sample_rate,
        track.duration_secs()
    );

    let detector = CueDetector::new(config.cues.clone());
    let env = envelope(&track);
    let report = detector
        .analyze(&env, track.sample_rate, clock)
        .map_err(|e| anyhow::anyhow!("Cue detection failed: {e}"))?;

    println!("  Loud frames: {}", report.loud_frames);
    if !report.rejected.is_empty() {
        println!("  Rejected short bursts at frames: {:?}", report.rejected);
    }

    println!("\nCue onsets:");
    for (i, &frame) in report.onsets.iter().enumerate() {
        println!(
            "  {:>2}. frame {frame:>7}  ({:.2}s)",
            i + 1,
            clock.frame_to_secs(frame)
        );
    }

    let onsets = detector
        .require_expected(report)
        .map_err(|e| anyhow::anyhow!("Cue detection failed: {e}"))?;
    println!("\nFound the expected {} cues.", onsets.len());

    Ok(())
}
