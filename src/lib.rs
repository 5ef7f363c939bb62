pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::services::ai_service::AiService;
use crate::services::scoring_service::{AnswerScorer, HeuristicScorer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ai: AiService,
    pub scorer: Arc<dyn AnswerScorer>,
}

impl AppState {
    pub fn new(pool: PgPool) -> error::Result<Self> {
        let config = config::get_config();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let ai = AiService::new(
            config.ai_api_key.clone(),
            config.ai_base_url.clone(),
            config.ai_model.clone(),
            client,
        );
        Ok(Self {
            pool,
            ai,
            scorer: Arc::new(HeuristicScorer),
        })
    }
}
