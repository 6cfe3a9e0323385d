//! Amplitude envelope.

use crate::wav::AudioTrack;

/// Mean absolute amplitude across channels, one value per sample frame.
///
/// Channels shorter than the first are treated as silent past their end.
pub fn envelope(track: &AudioTrack) -> Vec<f32> {
    let channels = track.channels.len();
    if channels == 0 {
        return Vec::new();
    }

    (0..track.len())
        .map(|i| {
            let sum: f32 = track
                .channels
                .iter()
                .map(|c| c.get(i).map_or(0.0, |s| s.abs()))
                .sum();
            sum / channels as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_absolute_across_channels() {
        let track = AudioTrack {
            sample_rate: 100,
            channels: vec![vec![0.5, -0.2, 0.0], vec![-0.1, -0.2, 0.4]],
        };
        let env = envelope(&track);
        assert_eq!(env.len(), 3);
        assert!((env[0] - 0.3).abs() < 1e-6);
        assert!((env[1] - 0.2).abs() < 1e-6);
        assert!((env[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_track() {
        let track = AudioTrack {
            sample_rate: 100,
            channels: vec![],
        };
        assert!(envelope(&track).is_empty());
    }
}
