use std::time::Duration;

use fundsp::prelude32 as dsp;

pub const SAMPLE_RATE: u32 = 44_100;

/// Envelopes decay exponentially towards this gain rather than to silence.
const GAIN_FLOOR: f32 = 0.01;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator note: optional exponential pitch sweep plus an exponential
/// gain decay over the whole duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Seconds the pitch takes to reach `end_hz`; 0 keeps `start_hz`.
    pub sweep_secs: f32,
    pub gain: f32,
    pub duration_secs: f32,
}

impl Tone {
    const fn steady(waveform: Waveform, hz: f32, gain: f32, duration_secs: f32) -> Self {
        Self {
            waveform,
            start_hz: hz,
            end_hz: hz,
            sweep_secs: 0.0,
            gain,
            duration_secs,
        }
    }
}

pub const CLICK: Tone = Tone::steady(Waveform::Sine, 800.0, 0.2, 0.1);

pub const EAT: Tone = Tone {
    waveform: Waveform::Square,
    start_hz: 523.0,
    end_hz: 1046.0,
    sweep_secs: 0.1,
    gain: 0.3,
    duration_secs: 0.2,
};

pub const GAME_OVER: Tone = Tone {
    waveform: Waveform::Sawtooth,
    start_hz: 349.0,
    end_hz: 174.0,
    sweep_secs: 0.5,
    gain: 0.4,
    duration_secs: 0.6,
};

const FANFARE_HZ: [f32; 4] = [523.0, 659.0, 784.0, 1047.0];
const FANFARE_STEP: Duration = Duration::from_millis(100);

const MUSIC_HZ: [f32; 4] = [262.0, 330.0, 392.0, 494.0];
const MUSIC_WAVEFORMS: [Waveform; 3] = [Waveform::Sine, Waveform::Square, Waveform::Triangle];

/// Time between background music notes.
pub const MUSIC_NOTE_PERIOD: Duration = Duration::from_millis(300);

/// Rising four-note arpeggio played on a new record, as (offset, note).
#[must_use]
pub fn fanfare() -> Vec<(Duration, Tone)> {
    FANFARE_HZ
        .iter()
        .zip(0u32..)
        .map(|(&hz, step)| (FANFARE_STEP * step, Tone::steady(Waveform::Sine, hz, 0.3, 0.2)))
        .collect()
}

/// The `index`-th note of the endless background arpeggio.
#[must_use]
pub fn music_note(index: usize) -> Tone {
    Tone::steady(
        MUSIC_WAVEFORMS[index % MUSIC_WAVEFORMS.len()],
        MUSIC_HZ[index % MUSIC_HZ.len()],
        0.1,
        0.3,
    )
}

/// Renders `tone` to mono samples at [`SAMPLE_RATE`], scaled by `volume`.
#[must_use]
pub fn render(tone: &Tone, volume: f32) -> Vec<f32> {
    let Tone {
        waveform,
        start_hz,
        end_hz,
        sweep_secs,
        gain,
        duration_secs,
    } = *tone;

    let pitch = move |t: f32| {
        if sweep_secs <= 0.0 {
            start_hz
        } else {
            dsp::xerp(start_hz, end_hz, (t / sweep_secs).min(1.0))
        }
    };
    let envelope =
        move |t: f32| dsp::xerp(gain, GAIN_FLOOR, (t / duration_secs).min(1.0)) * volume;

    let mut node: Box<dyn dsp::AudioUnit> = match waveform {
        Waveform::Sine => Box::new((dsp::lfo(pitch) >> dsp::sine()) * dsp::lfo(envelope)),
        Waveform::Square => Box::new((dsp::lfo(pitch) >> dsp::square()) * dsp::lfo(envelope)),
        Waveform::Sawtooth => Box::new((dsp::lfo(pitch) >> dsp::saw()) * dsp::lfo(envelope)),
        Waveform::Triangle => Box::new((dsp::lfo(pitch) >> dsp::triangle()) * dsp::lfo(envelope)),
    };

    render_mono(node.as_mut(), duration_secs)
}

fn render_mono(node: &mut dyn dsp::AudioUnit, duration: f32) -> Vec<f32> {
    node.set_sample_rate(f64::from(SAMPLE_RATE));
    node.reset();

    let sample_count = (SAMPLE_RATE as f32 * duration) as usize;
    let mut samples = Vec::with_capacity(sample_count);
    for _ in 0..sample_count {
        samples.push(node.get_mono());
    }
    samples
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CLICK, GAME_OVER, SAMPLE_RATE, Waveform, fanfare, music_note, render};

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn rendered_length_matches_duration() {
        let samples = render(&GAME_OVER, 1.0);

        assert_eq!(samples.len(), (SAMPLE_RATE as f32 * 0.6) as usize);
    }

    #[test]
    fn volume_scales_output() {
        let loud = peak(&render(&CLICK, 1.0));
        let muted = peak(&render(&CLICK, 0.0));

        assert!(loud > 0.0);
        assert!(loud <= 0.25);
        assert_eq!(muted, 0.0);
    }

    #[test]
    fn envelope_decays() {
        let samples = render(&CLICK, 1.0);
        let quarter = samples.len() / 4;

        let head = peak(&samples[..quarter]);
        let tail = peak(&samples[samples.len() - quarter..]);

        assert!(tail < head);
    }

    #[test]
    fn fanfare_steps_are_100ms_apart() {
        let offsets: Vec<Duration> = fanfare().into_iter().map(|(offset, _)| offset).collect();

        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
            ]
        );
    }

    #[test]
    fn music_cycles_waveforms_and_pitches_independently() {
        assert_eq!(music_note(0).waveform, Waveform::Sine);
        assert_eq!(music_note(1).waveform, Waveform::Square);
        assert_eq!(music_note(2).waveform, Waveform::Triangle);
        assert_eq!(music_note(3).waveform, Waveform::Sine);
        assert_eq!(music_note(3).start_hz, 494.0);
        assert_eq!(music_note(4).start_hz, 262.0);
    }
}
