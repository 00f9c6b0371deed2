use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub usado: bool,
    pub created_at: DateTime<Utc>,
}
