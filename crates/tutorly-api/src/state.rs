//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository traits; AppState pins them to the
//! SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use tutorly_core::chat::service::ChatService;
use tutorly_core::llm::box_provider::BoxLlmProvider;
use tutorly_core::llm::settings::ModelSettings;
use tutorly_core::taxonomy::classifier::Classifier;
use tutorly_core::taxonomy::seeder::SubjectSeeder;
use tutorly_core::taxonomy::service::TaxonomyService;
use tutorly_core::tutor::orchestrator::TutorService;
use tutorly_infra::config::load_app_config;
use tutorly_infra::filesystem::ensure_data_dir;
use tutorly_infra::llm::build_provider;
use tutorly_infra::sqlite::chat::SqliteChatRepository;
use tutorly_infra::sqlite::message::SqliteMessageRepository;
use tutorly_infra::sqlite::pool::{DatabasePool, database_url};
use tutorly_infra::sqlite::taxonomy::SqliteTaxonomyRepository;
use tutorly_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteMessageRepository>;

pub type ConcreteTaxonomyService = TaxonomyService<SqliteTaxonomyRepository>;

pub type ConcreteSeeder = SubjectSeeder<SqliteTaxonomyRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub tutor_service: Arc<TutorService>,
    pub taxonomy_service: Arc<ConcreteTaxonomyService>,
    pub seeder: Arc<ConcreteSeeder>,
    /// Handed to streaming replies, which outlive the request handler.
    pub message_repo: SqliteMessageRepository,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, build
    /// the model provider and wire services.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        ensure_data_dir(&data_dir).await?;
        let config = load_app_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let provider = Arc::new(build_provider(&config.llm)?);

        Ok(Self::from_parts(db_pool, provider, config, data_dir))
    }

    /// Wire services from already constructed infrastructure.
    pub fn from_parts(
        db_pool: DatabasePool,
        provider: Arc<BoxLlmProvider>,
        config: AppConfig,
        data_dir: PathBuf,
    ) -> Self {
        let settings = ModelSettings::from(&config.llm);

        let message_repo = SqliteMessageRepository::new(db_pool.clone());
        let chat_service =
            ChatService::new(SqliteChatRepository::new(db_pool.clone()), message_repo.clone());

        let tutor_service = TutorService::new(Arc::clone(&provider), settings.clone());

        let taxonomy_repo = SqliteTaxonomyRepository::new(db_pool);
        let classifier = Classifier::new(Arc::clone(&provider), settings.clone());
        let taxonomy_service = TaxonomyService::new(taxonomy_repo.clone(), classifier);

        let seeder = SubjectSeeder::new(taxonomy_repo, provider, settings)
            .with_subjects(config.seeding.subjects.clone());

        Self {
            chat_service: Arc::new(chat_service),
            tutor_service: Arc::new(tutor_service),
            taxonomy_service: Arc::new(taxonomy_service),
            seeder: Arc::new(seeder),
            message_repo,
            config: Arc::new(config),
            data_dir,
        }
    }
}
