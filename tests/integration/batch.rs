// Batch runs over several sources

use crate::common::{Recorder, SELECTIVE_ENCODER, dir_entries, install_encoder, write_source};
use ffcrush::engine::{BatchRunner, EncodingProfile, JobDriver, JobError, JobEvent};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

#[test]
fn test_batch_continues_after_failure() {
    let dir = TempDir::new().unwrap();
    let encoder = install_encoder(dir.path(), SELECTIVE_ENCODER);
    let driver = JobDriver::new(encoder.to_string_lossy());
    let profile = EncodingProfile::default();

    let sources = vec![
        write_source(dir.path(), "a.mkv"),
        write_source(dir.path(), "broken.mkv"),
        write_source(dir.path(), "c.avi"),
    ];

    let mut recorder = Recorder::default();
    let summary = BatchRunner::new(&driver, &profile)
        .run(&sources, &mut recorder)
        .unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.completed.len(), 2);
    assert_eq!(summary.failed.len(), 1);

    let (failed_source, message) = &summary.failed[0];
    assert_eq!(failed_source, &sources[1]);
    assert!(message.contains("Invalid data"), "{}", message);

    assert_eq!(dir_entries(dir.path()), vec!["a.mp4", "broken.mkv", "c.mp4"]);

    let started: Vec<(usize, usize)> = recorder
        .events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Started { index, count, .. } => Some((*index, *count)),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![(0, 3), (1, 3), (2, 3)]);
}

#[test]
fn test_interrupted_batch_stops() {
    let dir = TempDir::new().unwrap();
    let encoder = install_encoder(dir.path(), SELECTIVE_ENCODER);
    let driver =
        JobDriver::new(encoder.to_string_lossy()).with_abort_flag(Arc::new(AtomicBool::new(true)));
    let profile = EncodingProfile::default();

    let sources = vec![
        write_source(dir.path(), "a.mkv"),
        write_source(dir.path(), "b.mkv"),
    ];

    let mut recorder = Recorder::default();
    let result = BatchRunner::new(&driver, &profile).run(&sources, &mut recorder);

    assert!(matches!(result, Err(JobError::Interrupted)));
    assert_eq!(dir_entries(dir.path()), vec!["a.mkv", "b.mkv"]);

    let started = recorder
        .events
        .iter()
        .filter(|e| matches!(e, JobEvent::Started { .. }))
        .count();
    assert_eq!(started, 1, "no job should start after an interruption");
    assert!(
        !recorder
            .events
            .iter()
            .any(|e| matches!(e, JobEvent::Completed { .. }))
    );
}
