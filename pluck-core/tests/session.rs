//! End-to-end session tests: synthesized sine frames through the full
//! estimate -> correct -> smooth -> evaluate pipeline.

use pluck_core::{TunerSession, TuningTarget, TuningVerdict, tuning};

const SAMPLE_RATE: f32 = 44100.0;
const FRAME_SIZE: usize = 4096;

fn sine_frame(frequency: f32) -> Vec<f32> {
    (0..FRAME_SIZE)
        .map(|i| 0.6 * (2.0 * std::f32::consts::PI * frequency * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

fn a2() -> TuningTarget {
    TuningTarget::Manual(tuning::standard_tuning()[1])
}

#[test]
fn locked_a2_converges_to_in_tune() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    let frame = sine_frame(110.0);
    let mut status = None;
    for _ in 0..20 {
        status = Some(session.process_frame(&frame, SAMPLE_RATE).unwrap());
    }
    let status = status.unwrap();

    assert_eq!(status.display_name, "A2");
    assert_eq!(status.note_name, "A2");
    assert_eq!(status.verdict, TuningVerdict::InTune);
    assert!(status.confidence > 0.6);
    assert!(status.smoothed_cents.abs() <= 5.0);
    let frequency = status.frequency.expect("pitched frame");
    assert!((frequency - 110.0).abs() < 1.0, "got {} Hz", frequency);
}

#[test]
fn harmonic_folds_back_to_locked_string() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    // Second harmonic of A2; octave correction must bring it home.
    let frame = sine_frame(220.0);
    let mut status = None;
    for _ in 0..10 {
        status = Some(session.process_frame(&frame, SAMPLE_RATE).unwrap());
    }
    let status = status.unwrap();

    let frequency = status.frequency.expect("pitched frame");
    assert!((frequency - 110.0).abs() < 1.0, "got {} Hz", frequency);
    assert!(status.smoothed_cents.abs() <= 5.0);
}

#[test]
fn sharp_string_reads_as_tuning() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    // 113 Hz is about 47 cents sharp of A2.
    let frame = sine_frame(113.0);
    let mut status = None;
    for _ in 0..40 {
        status = Some(session.process_frame(&frame, SAMPLE_RATE).unwrap());
    }
    let status = status.unwrap();

    assert_eq!(status.verdict, TuningVerdict::Tuning);
    assert!(
        status.smoothed_cents > 40.0 && status.smoothed_cents < 55.0,
        "smoothed to {} cents",
        status.smoothed_cents
    );
    assert_eq!(status.rounded_cents, status.smoothed_cents.round() as i32);
}

#[test]
fn auto_mode_reports_nearest_string() {
    let mut session = TunerSession::new();
    session.start();

    let frame = sine_frame(196.0);
    let status = session.process_frame(&frame, SAMPLE_RATE).unwrap();

    assert_eq!(status.display_name, "G3");
    assert_eq!(status.note_name, "G3");
    // First frame of a fresh session can never be settled.
    assert_eq!(status.verdict, TuningVerdict::Settling);
}

#[test]
fn silence_reports_listening() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    let frame = vec![0.0f32; FRAME_SIZE];
    let status = session.process_frame(&frame, SAMPLE_RATE).unwrap();

    assert_eq!(status.verdict, TuningVerdict::Listening);
    assert_eq!(status.frequency, None);
    assert_eq!(status.note_name, tuning::NO_NOTE);
    assert_eq!(status.display_name, "A2");
}

#[test]
fn silence_holds_the_previous_needle_position() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    let pitched = sine_frame(113.0);
    let mut last_smoothed = 0.0;
    for _ in 0..20 {
        last_smoothed = session
            .process_frame(&pitched, SAMPLE_RATE)
            .unwrap()
            .smoothed_cents;
    }

    let silent = vec![0.0f32; FRAME_SIZE];
    let status = session.process_frame(&silent, SAMPLE_RATE).unwrap();
    assert_eq!(status.verdict, TuningVerdict::Listening);
    assert_eq!(status.smoothed_cents, last_smoothed);
}

#[test]
fn target_change_resets_tracking() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    let frame = sine_frame(110.0);
    let mut settled = 0.0;
    for _ in 0..20 {
        settled = session.process_frame(&frame, SAMPLE_RATE).unwrap().confidence;
    }
    assert!(settled > 0.6);

    // Re-locking the same string still clears the history.
    session.select_target(a2());
    let status = session.process_frame(&frame, SAMPLE_RATE).unwrap();
    assert!(
        status.confidence < 0.3,
        "confidence {} did not reset",
        status.confidence
    );
}

#[test]
fn stop_and_restart_pairs_cleanly() {
    let mut session = TunerSession::new();
    session.select_target(a2());
    session.start();

    let frame = sine_frame(110.0);
    for _ in 0..20 {
        session.process_frame(&frame, SAMPLE_RATE).unwrap();
    }
    session.stop();
    assert!(!session.is_running());
    assert!(session.process_frame(&frame, SAMPLE_RATE).is_err());

    session.start();
    assert!(session.is_running());
    let status = session.process_frame(&frame, SAMPLE_RATE).unwrap();
    // Fresh tracking state after the restart.
    assert!(status.confidence < 0.3);
}
