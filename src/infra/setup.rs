use crate::{
    adapters::http::app_state::AppState,
    infra::{
        RateLimiterTrait, ai::UnconfiguredAiService, config::AppConfig, postgres_persistence,
        rate_limit::RedisRateLimiter,
    },
    use_cases::{
        coach::{CoachClient, CoachUseCases},
        identity::{IdentityUseCases, UserLookup},
        meal_plan::{MealPlanGenerator, MealPlanRepo, MealPlanUseCases, NutritionLookup},
        user::{AuthUseCases, UserRepo},
    },
};
use std::fs::File;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    init_tracing(config.log_file.as_deref());

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
        )
        .await?,
    );

    let user_lookup_arc = postgres_arc.clone() as Arc<dyn UserLookup>;
    let user_repo_arc = postgres_arc.clone() as Arc<dyn UserRepo>;
    let meal_plan_repo_arc = postgres_arc.clone() as Arc<dyn MealPlanRepo>;

    let ai = Arc::new(UnconfiguredAiService);
    tracing::warn!("No AI service configured; meal plan generation and coach chat are unavailable");

    let identity_use_cases = IdentityUseCases::new(user_lookup_arc);
    let auth_use_cases = AuthUseCases::new(user_repo_arc, config.jwt.clone(), config.bcrypt_cost);
    let meal_plan_use_cases = MealPlanUseCases::new(
        meal_plan_repo_arc,
        ai.clone() as Arc<dyn MealPlanGenerator>,
        ai.clone() as Arc<dyn NutritionLookup>,
    );
    let coach_use_cases = CoachUseCases::new(ai as Arc<dyn CoachClient>);

    Ok(AppState {
        config: Arc::new(config),
        identity_use_cases: Arc::new(identity_use_cases),
        auth_use_cases: Arc::new(auth_use_cases),
        meal_plan_use_cases: Arc::new(meal_plan_use_cases),
        coach_use_cases: Arc::new(coach_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitness_api=info,tower_http=info".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when a path is configured
    let json_layer = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(err) => {
            eprintln!("cannot create log file {path}: {err}");
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
