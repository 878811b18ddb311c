use app_state::AppSettings;
use color_eyre::Result;
use common_services::forward_client::ForwardClient;
use common_types::queue::QueueName;
use sqlx::PgPool;

pub struct WorkerContext {
    pub worker_id: String,
    /// Queues this worker claims jobs from.
    pub queues: Vec<QueueName>,
    pub pool: PgPool,
    pub settings: AppSettings,
    pub forward_client: ForwardClient,
}

impl WorkerContext {
    /// Creates a new instance of `WorkerContext`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured external webhook URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(
        pool: PgPool,
        settings: AppSettings,
        worker_id: String,
        queues: Vec<QueueName>,
    ) -> Result<Self> {
        let forward_client = ForwardClient::from_settings(&settings.integrations)?;
        let queues = if queues.is_empty() {
            QueueName::ALL.to_vec()
        } else {
            queues
        };
        Ok(Self {
            worker_id,
            queues,
            pool,
            settings,
            forward_client,
        })
    }
}
