//! End-to-end voice rounds against a stub platform API.

mod common;

use std::sync::atomic::Ordering;

use sky_racer::game::EngineConfig;
use sky_racer::render::DrawCmd;
use sky_racer::session::VoiceSession;

#[tokio::test]
async fn voice_round_submits_its_final_score() {
    let (addr, platform) = common::spawn_platform().await;
    let (_, scores) = common::clients(addr);
    platform.high.store(40, Ordering::SeqCst);

    // Dense, fast obstacles so the stationary airplane crashes
    // quickly; seeded, so the run is repeatable
    let config = EngineConfig {
        spawn_interval_ms: 50,
        base_obstacle_speed: 40.0,
        ..EngineConfig::default()
    };
    let mut session = VoiceSession::with_config(config, 21, scores);
    session.refresh_high_score().await;
    session.start(0);

    let mut now = 0u64;
    for _ in 0..100_000 {
        now += 33;
        session.tick(now).await;
        if session.state().game_over {
            break;
        }
    }
    assert!(session.state().game_over, "round never crashed");

    let score = session.state().score;
    assert_eq!(
        platform.submissions.lock().clone(),
        vec![("voice".to_string(), score)]
    );

    // The terminal state is inert; nothing resubmits
    for _ in 0..5 {
        now += 33;
        session.tick(now).await;
    }
    assert_eq!(platform.submissions.lock().len(), 1);

    // The game-over scene shows the authoritative high score
    let expected_high = score.max(40);
    let scene = session.scene(now);
    assert!(scene.iter().any(|cmd| matches!(
        cmd,
        DrawCmd::Text { text, .. } if *text == format!("High Score: {expected_high}")
    )));
    assert!(scene.iter().any(|cmd| matches!(
        cmd,
        DrawCmd::Text { text, .. } if text == "GAME OVER"
    )));
}
