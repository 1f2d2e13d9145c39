//! Full sessions driven through the public API, the way a host shell does

use glam::Vec2;

use aim_trainer::consts::{COUNTDOWN_INTERVAL_MS, SESSION_SECS, TARGET_GROW_MS, TARGET_TTL_MS};
use aim_trainer::platform::PlatformStore;
use aim_trainer::sim::{FinalStats, GameEvent, LiveStats, Session, SessionPhase};
use aim_trainer::HighScores;

const SURFACE: Vec2 = Vec2::new(1024.0, 768.0);
const FRAME_MS: f64 = 16.0;

/// Play a whole session at 60fps, clicking only the first target once it
/// has fully grown. Returns the final stats and every event emitted.
fn play_one_hit_session(seed: u64) -> (Option<FinalStats>, Vec<GameEvent>) {
    let mut session = Session::new(seed, SURFACE);
    let mut events = Vec::new();
    let mut final_stats = None;
    let mut clicked = false;

    session.start(0.0);
    let mut now = 0.0;
    let mut next_tick = COUNTDOWN_INTERVAL_MS as f64;

    while session.is_running() {
        now += FRAME_MS;
        session.frame(now);

        if !clicked {
            if let Some(target) = session.targets().first() {
                if now - target.created_ms >= TARGET_GROW_MS {
                    assert!(session.click(target.pos));
                    clicked = true;
                }
            }
        }

        if now >= next_tick {
            next_tick += COUNTDOWN_INTERVAL_MS as f64;
            if let Some(stats) = session.tick_second() {
                assert!(final_stats.is_none(), "final stats emitted twice");
                final_stats = Some(stats);
            }
        }

        events.extend(session.drain_events());
    }

    (final_stats, events)
}

#[test]
fn test_one_hit_then_expiries() {
    let (stats, events) = play_one_hit_session(42);

    assert_eq!(
        stats,
        Some(FinalStats {
            score: 100,
            accuracy: 100.0,
            max_combo: 1,
            hits: 1,
            total_clicks: 1,
        })
    );

    let hits = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Hit { .. }))
        .count();
    let expired = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Expired { .. }))
        .count();
    let ended = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Ended(_)))
        .count();
    assert_eq!(hits, 1);
    assert!(expired >= 1, "unclicked targets should expire");
    assert_eq!(ended, 1);
    assert_eq!(events.first(), Some(&GameEvent::Started));
    assert!(matches!(events.last(), Some(GameEvent::Ended(_))));
}

#[test]
fn test_session_lasts_thirty_ticks() {
    let mut session = Session::new(7, SURFACE);
    session.start(0.0);
    for _ in 1..SESSION_SECS {
        assert_eq!(session.tick_second(), None);
    }
    assert_eq!(session.live_stats().time_left, 1);
    assert!(session.tick_second().is_some());
    assert_eq!(session.phase(), SessionPhase::Ended);
    assert!(session.targets().is_empty());
    assert_eq!(session.tick_second(), None);
}

#[test]
fn test_expired_target_leaves_stats_alone() {
    let mut session = Session::new(3, SURFACE);
    session.start(0.0);

    // First spawn once the base interval has passed
    session.frame(1600.0);
    assert_eq!(session.targets().len(), 1);
    let spawned = session.targets()[0].created_ms;

    session.frame(spawned + TARGET_TTL_MS);
    assert!(session
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::Expired { .. })));

    let live = session.live_stats();
    assert_eq!(live.score, 0);
    assert_eq!(live.combo, 0);
    assert_eq!(session.state().hits, 0);
}

#[test]
fn test_restart_resets_everything() {
    let (stats, _) = play_one_hit_session(99);
    assert!(stats.is_some());

    let mut session = Session::new(99, SURFACE);
    session.start(0.0);
    session.frame(1600.0);
    let pos = session.targets()[0].pos;
    session.frame(1600.0 + TARGET_GROW_MS);
    assert!(session.click(pos));
    assert!(!session.click(Vec2::new(-100.0, -100.0)));
    for _ in 0..SESSION_SECS {
        session.tick_second();
    }
    assert_eq!(session.phase(), SessionPhase::Ended);

    session.start(50_000.0);
    assert_eq!(
        session.live_stats(),
        LiveStats {
            score: 0,
            time_left: SESSION_SECS,
            accuracy: 0.0,
            combo: 0,
        }
    );
    let state = session.state();
    assert_eq!(state.hits, 0);
    assert_eq!(state.total_clicks, 0);
    assert_eq!(state.max_combo, 0);
    assert!(state.targets.is_empty());
    assert_eq!(session.drain_events(), vec![GameEvent::Started]);
}

#[test]
fn test_clicks_after_end_are_ignored() {
    let mut session = Session::new(5, SURFACE).with_duration(1);
    session.start(0.0);
    let stats = session.tick_second().unwrap();
    assert!(!session.click(Vec2::new(100.0, 100.0)));
    assert_eq!(session.state().total_clicks, stats.total_clicks);
}

#[test]
fn test_final_stats_reach_local_scores() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlatformStore::with_dir(dir.path());

    let (stats, _) = play_one_hit_session(11);
    let stats = stats.unwrap();

    let mut scores = HighScores::load(&store);
    assert_eq!(scores.record(&store, &stats, 1_700_000_000_000.0), Some(1));

    let reloaded = HighScores::load(&store);
    assert_eq!(reloaded.entries.len(), 1);
    assert_eq!(reloaded.entries[0].score, 100);
    assert_eq!(reloaded.entries[0].accuracy, 100.0);
}
