//! Fitness RPG status tool
//!
//! Opens (or creates) the local store, makes sure the schema, the food
//! catalog and the configured user's goals exist, then logs a short status
//! report: level, XP, this week's workouts and a day's nutrition.
//!
//! Usage: `fitness-rpg [YYYY-MM-DD]`; the date defaults to today.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local, Utc};
use fitness_rpg_backend::{
    config, db,
    services::{NutritionService, ProgressionService, WorkoutService},
    state::AppState,
};
use fitness_rpg_shared::dates::date_bucket;
use fitness_rpg_shared::validation::parse_date_bucket_input;
use fitness_rpg_shared::SessionRank;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        database = %config.database.url,
        "Starting Fitness RPG"
    );

    // Init failures are fatal: without a schema nothing else can run
    let state = AppState::connect(config).await?;
    db::health_check(state.db()).await?;
    let user_id = state.user_id().to_string();

    if state.config().catalog.seed_on_startup {
        let seeded = state.foods.seed_catalog().await?;
        if seeded > 0 {
            info!(seeded, "Food catalog initialized");
        }
    }
    state.goals.ensure_defaults(&user_id).await?;

    let now: DateTime<FixedOffset> = Local::now().into();
    let day = match std::env::args().nth(1) {
        Some(arg) => parse_date_bucket_input(&arg)?,
        None => date_bucket(&now),
    };

    let progression = ProgressionService::state_for_user(&state, &user_id, Utc::now()).await?;
    info!(
        user_id = %user_id,
        level = progression.level,
        level_name = %progression.level_name,
        xp = progression.xp,
        total_workouts = progression.total_workouts,
        weekly_workouts = progression.weekly_workouts,
        workouts_to_next_level = progression.workouts_to_next_level,
        "Progression"
    );

    if let Some(last) = WorkoutService::list_workouts(&state, &user_id).await?.first() {
        info!(
            workout_id = %last.id,
            started = %last.start_time,
            session_xp = last.xp_earned,
            rank = SessionRank::from_xp(last.xp_earned).label(),
            completion_pct = (last.completion_rate() * 100.0).round(),
            "Last workout"
        );
    }

    let day_view = NutritionService::nutrition_for_date(&state, &user_id, day).await?;
    info!(
        date = %day_view.summary.date,
        calories = day_view.summary.total_calories,
        calorie_goal = day_view.summary.goal_calories,
        calories_remaining = day_view.progress.calories.remaining,
        protein = day_view.summary.total_protein,
        carbs = day_view.summary.total_carbs,
        fats = day_view.summary.total_fats,
        water_ml = day_view.summary.total_water,
        logs = day_view.summary.log_count,
        "Nutrition"
    );

    state.db().close().await;
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "fitness_rpg_backend=info,fitness_rpg=info".into()
        } else {
            "fitness_rpg_backend=debug,fitness_rpg=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
