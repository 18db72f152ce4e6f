//! Integration tests for workout saving with level-up detection

mod common;

use chrono::Duration;
use common::{utc, workout, TestApp, USER};
use fitness_rpg_backend::error::StorageError;
use fitness_rpg_backend::services::{ProgressionService, WorkoutInput, WorkoutService};
use fitness_rpg_shared::LevelTransition;

#[tokio::test]
async fn test_fifth_workout_levels_up_sixth_does_not() {
    let app = TestApp::new().await;
    let start = utc(2024, 5, 1, 8, 0);

    for i in 0..4 {
        let transition = WorkoutService::save_workout(
            &app.state,
            &workout(&format!("w{i}"), start + Duration::days(i), &[1]),
        )
        .await
        .unwrap();
        assert!(!transition.leveled_up);
    }

    let fifth = WorkoutService::save_workout(&app.state, &workout("w4", start + Duration::days(4), &[1]))
        .await
        .unwrap();
    assert_eq!(
        fifth,
        LevelTransition {
            leveled_up: true,
            from: 0,
            to: 1
        }
    );

    let sixth = WorkoutService::save_workout(&app.state, &workout("w5", start + Duration::days(5), &[1]))
        .await
        .unwrap();
    assert_eq!(
        sixth,
        LevelTransition {
            leveled_up: false,
            from: 1,
            to: 1
        }
    );
}

#[tokio::test]
async fn test_rejected_save_does_not_advance_count() {
    let app = TestApp::new().await;
    let start = utc(2024, 5, 1, 8, 0);
    WorkoutService::save_workout(&app.state, &workout("w1", start, &[1]))
        .await
        .unwrap();

    let err = WorkoutService::save_workout(&app.state, &workout("w1", start, &[1]))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::WriteConflict(_)));

    let progression = ProgressionService::state_for_user(&app.state, USER, start)
        .await
        .unwrap();
    assert_eq!(progression.total_workouts, 1);
}

#[tokio::test]
async fn test_blank_user_is_rejected_before_storage() {
    let app = TestApp::new().await;
    let mut invalid = workout("w1", utc(2024, 5, 1, 8, 0), &[1]);
    invalid.user_id = String::new();

    let err = WorkoutService::save_workout(&app.state, &invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));
    assert_eq!(app.count_all("workouts").await, 0);
}

#[tokio::test]
async fn test_progression_state_for_user() {
    let app = TestApp::new().await;
    let now = utc(2024, 6, 30, 12, 0);

    // 6 workouts, 2 of them within the last week
    for i in 0..6 {
        let start = now - Duration::days(2 + i * 5);
        WorkoutService::save_workout(&app.state, &workout(&format!("w{i}"), start, &[2]))
            .await
            .unwrap();
    }

    let progression = ProgressionService::state_for_user(&app.state, USER, now)
        .await
        .unwrap();

    assert_eq!(progression.total_workouts, 6);
    assert_eq!(progression.weekly_workouts, 2);
    assert_eq!(progression.level, 1);
    assert_eq!(progression.level_name, "Novice");
    assert_eq!(progression.xp, 300);
    assert_eq!(progression.next_level_at, Some(15));
    assert_eq!(progression.workouts_to_next_level, 9);
    assert!((progression.level_progress - 6.0 / 15.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_built_workout_round_trips_with_session_xp() {
    let app = TestApp::new().await;
    let template = workout("template", utc(2024, 5, 1, 8, 0), &[3, 2]);

    let built = WorkoutService::build(WorkoutInput {
        user_id: USER.to_string(),
        start_time: template.start_time,
        end_time: template.end_time,
        notes: None,
        exercises: template.exercises,
    });
    // Sets 0 and 2 of the first exercise and set 0 of the second are completed
    assert_eq!(built.xp_earned, 30);

    WorkoutService::save_workout(&app.state, &built).await.unwrap();

    let listed = WorkoutService::list_workouts(&app.state, USER).await.unwrap();
    assert_eq!(listed, vec![built]);
}
