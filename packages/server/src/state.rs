use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::contest::ContestService;
use crate::payment::PaymentGateway;
use crate::user::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn contests(&self) -> ContestService<'_> {
        ContestService::new(&self.db, self.config.database.op_timeout())
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.db, self.config.database.op_timeout())
    }
}
