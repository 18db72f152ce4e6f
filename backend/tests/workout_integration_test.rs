//! Integration tests for the workout repository

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{utc, workout, TestApp, USER};
use fitness_rpg_backend::error::StorageError;

#[tokio::test]
async fn test_save_then_read_reproduces_hierarchy() {
    let app = TestApp::new().await;
    let saved = workout("w1", utc(2024, 5, 1, 7, 30), &[3, 0, 2]);

    app.state.workouts.save(&saved).await.unwrap();

    let loaded = app.state.workouts.get_by_user(USER).await.unwrap();
    assert_eq!(loaded, vec![saved.clone()]);

    let by_id = app.state.workouts.get_by_id("w1").await.unwrap();
    assert_eq!(by_id, Some(saved));
}

#[tokio::test]
async fn test_round_trip_keeps_sub_millisecond_start_time() {
    let app = TestApp::new().await;
    let start = Utc.timestamp_opt(1_717_000_000, 123_456_789).unwrap();
    let saved = workout("w1", start, &[2]);

    app.state.workouts.save(&saved).await.unwrap();

    let loaded = app.state.workouts.get_by_id("w1").await.unwrap();
    assert_eq!(loaded, Some(saved));
}

#[tokio::test]
async fn test_sibling_order_follows_input_order() {
    let app = TestApp::new().await;
    let mut saved = workout("w1", utc(2024, 5, 1, 7, 30), &[2, 2]);
    // Ids sort opposite to position, so only orderIndex can explain the result
    saved.exercises[0].id = "z-first".to_string();
    saved.exercises[1].id = "a-second".to_string();
    saved.exercises[0].sets[0].id = "z-set".to_string();
    saved.exercises[0].sets[1].id = "a-set".to_string();

    app.state.workouts.save(&saved).await.unwrap();

    let loaded = app.state.workouts.get_by_id("w1").await.unwrap().unwrap();
    let exercise_ids: Vec<&str> = loaded.exercises.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(exercise_ids, ["z-first", "a-second"]);
    let set_ids: Vec<&str> = loaded.exercises[0].sets.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(set_ids, ["z-set", "a-set"]);
}

#[tokio::test]
async fn test_workouts_are_newest_first() {
    let app = TestApp::new().await;
    for (id, day) in [("w-mid", 10), ("w-old", 1), ("w-new", 20)] {
        app.state
            .workouts
            .save(&workout(id, utc(2024, 5, day, 9, 0), &[1]))
            .await
            .unwrap();
    }

    let ids: Vec<String> = app
        .state
        .workouts
        .get_by_user(USER)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(ids, ["w-new", "w-mid", "w-old"]);
}

#[tokio::test]
async fn test_workouts_are_scoped_to_user() {
    let app = TestApp::new().await;
    let mut other = workout("w-other", utc(2024, 5, 1, 9, 0), &[1]);
    other.user_id = "someone-else".to_string();
    app.state.workouts.save(&other).await.unwrap();

    assert!(app.state.workouts.get_by_user(USER).await.unwrap().is_empty());
    assert_eq!(app.state.workouts.count(USER).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_cascades_to_exercises_and_sets() {
    let app = TestApp::new().await;
    app.state
        .workouts
        .save(&workout("w1", utc(2024, 5, 1, 7, 30), &[2, 3]))
        .await
        .unwrap();
    app.state
        .workouts
        .save(&workout("w2", utc(2024, 5, 2, 7, 30), &[1]))
        .await
        .unwrap();

    assert!(app.state.workouts.delete("w1").await.unwrap());

    assert_eq!(app.count_where("exercises", "workoutId", "w1").await, 0);
    assert_eq!(app.count_where("sets", "exerciseId", "w1-e0").await, 0);
    assert_eq!(app.count_where("sets", "exerciseId", "w1-e1").await, 0);
    // The other workout is untouched
    assert_eq!(app.count_all("sets").await, 1);
    assert!(app.state.workouts.get_by_id("w1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_unknown_workout_is_noop() {
    let app = TestApp::new().await;

    assert!(!app.state.workouts.delete("missing").await.unwrap());
    assert!(!app.state.workouts.delete("missing").await.unwrap());
}

#[tokio::test]
async fn test_failed_save_leaves_no_rows() {
    let app = TestApp::new().await;
    let mut broken = workout("w1", utc(2024, 5, 1, 7, 30), &[2, 2]);
    // The last set collides with the first: the insert fails mid-transaction
    broken.exercises[1].sets[1].id = broken.exercises[0].sets[0].id.clone();

    let err = app.state.workouts.save(&broken).await.unwrap_err();
    assert!(matches!(err, StorageError::WriteConflict(_)));

    assert_eq!(app.count_where("workouts", "id", "w1").await, 0);
    assert_eq!(app.count_where("exercises", "workoutId", "w1").await, 0);
    assert_eq!(app.count_all("sets").await, 0);
}

#[tokio::test]
async fn test_duplicate_workout_id_is_rejected_without_overwrite() {
    let app = TestApp::new().await;
    let original = workout("w1", utc(2024, 5, 1, 7, 30), &[2]);
    app.state.workouts.save(&original).await.unwrap();

    let mut duplicate = workout("w1", utc(2024, 6, 1, 7, 30), &[]);
    duplicate.notes = Some("overwritten?".to_string());

    let err = app.state.workouts.save(&duplicate).await.unwrap_err();
    assert!(matches!(err, StorageError::WriteConflict(_)));
    assert!(!err.is_retryable());

    let stored = app.state.workouts.get_by_id("w1").await.unwrap();
    assert_eq!(stored, Some(original));
}

#[tokio::test]
async fn test_weekly_count_is_rolling_seven_days() {
    let app = TestApp::new().await;
    let now = utc(2024, 5, 15, 12, 0);

    let starts = [
        ("w-yesterday", now - Duration::days(1)),
        ("w-edge", now - Duration::days(7)),
        ("w-just-outside", now - Duration::days(7) - Duration::seconds(1)),
        ("w-old", now - Duration::days(30)),
    ];
    for (id, start) in starts {
        app.state.workouts.save(&workout(id, start, &[1])).await.unwrap();
    }

    assert_eq!(app.state.workouts.count(USER).await.unwrap(), 4);
    assert_eq!(app.state.workouts.weekly_count(USER, now).await.unwrap(), 2);
}

#[tokio::test]
async fn test_clear_all_removes_everything() {
    let app = TestApp::new().await;
    app.state
        .workouts
        .save(&workout("w1", utc(2024, 5, 1, 7, 30), &[2, 1]))
        .await
        .unwrap();

    app.state.workouts.clear_all().await.unwrap();

    assert_eq!(app.count_all("workouts").await, 0);
    assert_eq!(app.count_all("exercises").await, 0);
    assert_eq!(app.count_all("sets").await, 0);
}
