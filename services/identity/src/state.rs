use sea_orm::DatabaseConnection;

use storefront_bus::StreamPublisher;

use crate::infra::bus::BusEventPublisher;
use crate::infra::db::DbUserRepository;
use crate::infra::mailer::SmtpMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub publisher: StreamPublisher,
    pub mailer: SmtpMailer,
    pub jwt_secret: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn event_publisher(&self) -> BusEventPublisher<StreamPublisher> {
        BusEventPublisher {
            bus: self.publisher.clone(),
        }
    }

    pub fn mailer(&self) -> SmtpMailer {
        self.mailer.clone()
    }
}
