//! Built-in demo patches.

use telar_core::{AudioConfig, Patch, Record};
use telar_synth::{
    GainModule, GrainSettings, GrainShape, GrainSource, Granulator, JitterSequence, Metronome,
    Polyphony, SineGrainSource, SineVoice, Voice,
};

/// A-minor arpeggio frequencies.
const ARPEGGIO: [f32; 4] = [220.0, 261.63, 329.63, 440.0];

/// Metronome-driven polyphonic arpeggio: one metronome per chord tone,
/// phase-offset by interval, eight shared voices, mono output.
pub fn poly_demo(config: &AudioConfig) -> anyhow::Result<Patch> {
    let mut patch = Patch::new("root", config);

    let voices: Vec<Box<dyn Voice>> = (0..8)
        .map(|_| Box::new(SineVoice::new(220.0)) as Box<dyn Voice>)
        .collect();
    let poly = patch.add_module("poly", Box::new(Polyphony::new(voices, config)));
    let gain = patch.add_module("gain", Box::new(GainModule::new(0.3)));
    let out = patch.add_boundary_output();
    patch.connect(poly, 0, gain, 0)?;
    patch.connect(gain, 0, out, 0)?;

    for (i, &frequency) in ARPEGGIO.iter().enumerate() {
        let payload = Record::new()
            .with("command", "trigger")
            .with("duration", 0.15f32)
            .with("amplitude", 0.8f32)
            .with("frequency", frequency);
        // stagger the clocks so the chord rolls
        let interval = 0.8 + 0.2 * i as f32;
        patch.add_messenger(
            &format!("clock{i}"),
            Box::new(Metronome::new("poly", payload, interval)),
        );
    }

    Ok(patch)
}

/// Granular sine cloud: jittered onsets and pan spread over a 24-grain
/// pool, stereo output.
pub fn grains_demo(config: &AudioConfig) -> anyhow::Result<Patch> {
    let mut patch = Patch::new("root", config);

    let sources: Vec<Box<dyn GrainSource<GrainSettings>>> = (0..24)
        .map(|_| Box::new(SineGrainSource::new()) as Box<dyn GrainSource<GrainSettings>>)
        .collect();
    let settings = GrainSettings {
        frequency: 523.25,
        duration_secs: 0.08,
        amplitude: 0.3,
        attack: 0.3,
        release: 0.5,
        ..GrainSettings::default()
    };
    let sequence = JitterSequence::new(settings, 0.02, 0.6, 0.9, 0x5eed);
    let granulator = Granulator::new(
        sources,
        GrainShape::Asr { cosine: true },
        Box::new(sequence),
        config,
    );

    let grains = patch.add_module("grains", Box::new(granulator));
    let out_l = patch.add_boundary_output();
    let out_r = patch.add_boundary_output();
    patch.connect(grains, 0, out_l, 0)?;
    patch.connect(grains, 1, out_r, 0)?;

    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_demo_makes_sound() {
        let config = AudioConfig::new(44_100.0, 128);
        let mut patch = poly_demo(&config).unwrap();
        let mut heard = false;
        for _ in 0..20 {
            patch.process_block(&config);
            heard |= patch.output(0).iter().any(|&s| s != 0.0);
        }
        assert!(heard);
    }

    #[test]
    fn test_grains_demo_is_stereo() {
        let config = AudioConfig::new(44_100.0, 128);
        let mut patch = grains_demo(&config).unwrap();
        for _ in 0..50 {
            patch.process_block(&config);
        }
        assert!(patch.output(0).iter().any(|&s| s != 0.0));
        assert!(patch.output(1).iter().any(|&s| s != 0.0));
    }
}
