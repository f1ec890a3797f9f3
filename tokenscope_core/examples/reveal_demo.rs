//! Minimal end-to-end reveal: three tokens, fast timings, frames printed to
//! stdout as the phases advance.

use std::time::Duration;
use tokenscope_core::driver;
use tokenscope_core::engine::{AnimationEngine, AnimationInput, EngineConfig, InputGeometry};
use tokenscope_core::renderer::SceneContent;
use tokenscope_core::sequencer::SequencerConfig;
use tokenscope_env::{ScopeContext, TokioContext};

#[tokio::main]
async fn main() {
    let config = EngineConfig {
        sequencer: SequencerConfig {
            char_interval: Duration::from_millis(5),
            typing_pause: Duration::from_millis(20),
            scan_interval: Duration::from_millis(10),
            scan_hold: Duration::from_millis(5),
            scan_pause: Duration::from_millis(20),
            reveal_interval: Duration::from_millis(15),
            rotation_threshold: 0.75,
        },
        ..EngineConfig::default()
    };

    let ctx = TokioContext::new();
    let mut engine = AnimationEngine::new(config);

    let tokens: Vec<String> = ["The", " quick", " fox"].iter().map(|t| t.to_string()).collect();
    let vectors: Vec<Vec<f64>> = (0..tokens.len())
        .map(|i| (0..16).map(|d| ((i + 1) * (d + 1)) as f64 * 0.1).collect())
        .collect();
    engine.submit(
        AnimationInput::new("The quick fox", tokens, InputGeometry::Embeddings(vectors)),
        ctx.now(),
    );

    while driver::step(&ctx, &mut engine).await {
        let now = ctx.now();
        let scene = engine.scene(now);
        if let SceneContent::Cloud { points, arrows } = &scene.content {
            println!(
                "phase={:?} points={} arrows={} rotation={:.3}rad",
                scene.phase,
                points.len(),
                arrows.len(),
                engine.rotation_angle(now),
            );
        }
    }

    println!("complete: {}", engine.is_complete());
}
