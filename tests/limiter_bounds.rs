use std::sync::Arc;

use phiflame::audio::{
    soft_limit, OctaveFrequencySet, PanLaw, RenderEngine, SharedParameterState, OUTPUT_CEILING,
};
use phiflame::params::{AudioParams, VOICE_COUNT};

#[test]
fn limiter_is_strictly_bounded_for_spikes() {
    let spikes = [1.0f32, 10.0, 1e3, 1e9, 1e30, f32::MAX];
    for gain in [0.8, 1.0, 50.0, 1e6] {
        for &x in &spikes {
            for s in [x, -x] {
                let y = soft_limit(s, gain);
                assert!(y > -1.0 && y < 1.0, "gain={} x={} y={}", gain, s, y);
                assert!(y.abs() <= OUTPUT_CEILING);
            }
        }
    }
}

#[test]
fn full_scale_voices_with_hot_gain_stay_bounded() {
    let params = AudioParams {
        global_gain: 1e6,
        smoothing_alpha: 1.0,
        ..AudioParams::default()
    };
    let shared = Arc::new(SharedParameterState::new(
        OctaveFrequencySet::from_top(params.top_frequency_hz),
        PanLaw::new(&params.pan_positions),
    ));
    shared.publish_targets([1.0; VOICE_COUNT]);
    let mut engine = RenderEngine::new(Arc::clone(&shared), &params, params.sample_rate_hz);

    let mut out = vec![0.0f32; 8192];
    for _ in 0..10 {
        engine.process_interleaved(&mut out, 2);
        assert!(out.iter().all(|s| s.is_finite() && s.abs() < 1.0));
    }
    assert_eq!(shared.snapshot().amplitudes, [1.0; VOICE_COUNT]);
}
