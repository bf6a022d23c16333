use chrono::{DateTime, TimeZone, Utc};
use sqlx::{Pool, Sqlite};
use tracing::instrument;
use uuid::Uuid;

use super::{entity::*, error::*};
use crate::primitives::*;

const SELECT_COLUMNS: &str = r#"SELECT id, address, source, amount_sats, status, external_tx_id,
    error_message, created_at, updated_at FROM faucet_payout_requests"#;

#[derive(sqlx::FromRow)]
struct PayoutRequestRow {
    id: Uuid,
    address: String,
    source: String,
    amount_sats: i64,
    status: String,
    external_tx_id: Option<String>,
    error_message: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PayoutRequestRow> for PayoutRequest {
    type Error = PayoutError;

    fn try_from(row: PayoutRequestRow) -> Result<Self, Self::Error> {
        Ok(PayoutRequest {
            id: PayoutRequestId::from(row.id),
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
            address: row.address,
            source: row.source,
            external_tx_id: row.external_tx_id,
            amount: Satoshis::from(row.amount_sats),
            status: row.status.parse()?,
            error_message: row.error_message,
        })
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, PayoutError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(PayoutError::InvalidTimestamp(millis))
}

#[derive(Clone, Debug)]
pub struct PayoutRequests {
    pool: Pool<Sqlite>,
}

impl PayoutRequests {
    pub fn new(pool: &Pool<Sqlite>) -> Self {
        Self { pool: pool.clone() }
    }

    #[instrument(name = "payout_requests.create", skip(self), err)]
    pub async fn create(
        &self,
        new_request: NewPayoutRequest,
    ) -> Result<PayoutRequest, PayoutError> {
        let created_at = new_request.created_at.timestamp_millis();
        sqlx::query(
            r#"INSERT INTO faucet_payout_requests
               (id, address, source, amount_sats, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::from(new_request.id))
        .bind(new_request.address.as_str())
        .bind(new_request.source.as_str())
        .bind(i64::from(new_request.amount))
        .bind(PayoutStatus::Pending.as_str())
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(PayoutRequest {
            id: new_request.id,
            created_at: from_millis(created_at)?,
            updated_at: from_millis(created_at)?,
            address: new_request.address,
            source: new_request.source,
            external_tx_id: None,
            amount: new_request.amount,
            status: PayoutStatus::Pending,
            error_message: None,
        })
    }

    #[instrument(name = "payout_requests.find_by_id", skip(self), err)]
    pub async fn find_by_id(&self, id: PayoutRequestId) -> Result<PayoutRequest, PayoutError> {
        let row = sqlx::query_as::<_, PayoutRequestRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(PayoutError::PayoutRequestNotFound(id))?
            .try_into()
    }

    #[instrument(name = "payout_requests.list_by_status", skip(self), fields(n_found), err)]
    pub async fn list_by_status(
        &self,
        status: PayoutStatus,
        limit: u32,
    ) -> Result<Vec<PayoutRequest>, PayoutError> {
        let rows = sqlx::query_as::<_, PayoutRequestRow>(&format!(
            "{SELECT_COLUMNS} WHERE status = ? ORDER BY created_at, id LIMIT ?"
        ))
        .bind(status.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        tracing::Span::current().record("n_found", rows.len());
        rows.into_iter().map(PayoutRequest::try_from).collect()
    }

    #[instrument(name = "payout_requests.list_recent", skip(self), err)]
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<PayoutRequest>, PayoutError> {
        let rows = sqlx::query_as::<_, PayoutRequestRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, id LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PayoutRequest::try_from).collect()
    }

    #[instrument(name = "payout_requests.count_by_status", skip(self), err)]
    pub async fn count_by_status(&self, status: PayoutStatus) -> Result<i64, PayoutError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM faucet_payout_requests WHERE status = ?",
        )
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[instrument(name = "payout_requests.count_from_source_since", skip(self), err)]
    pub async fn count_from_source_since(
        &self,
        source: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, PayoutError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM faucet_payout_requests WHERE source = ? AND created_at > ?",
        )
        .bind(source)
        .bind(since.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[instrument(name = "payout_requests.total_broadcast_amount", skip(self), err)]
    pub async fn total_broadcast_amount(&self) -> Result<Satoshis, PayoutError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_sats), 0) FROM faucet_payout_requests WHERE status = ?",
        )
        .bind(PayoutStatus::Broadcast.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(Satoshis::from(total))
    }

    pub async fn mark_processing(&self, id: PayoutRequestId) -> Result<(), PayoutError> {
        self.transition(id, PayoutStatus::Pending, PayoutStatus::Processing, None, None)
            .await
    }

    pub async fn mark_broadcast(
        &self,
        id: PayoutRequestId,
        external_tx_id: &str,
    ) -> Result<(), PayoutError> {
        self.transition(
            id,
            PayoutStatus::Processing,
            PayoutStatus::Broadcast,
            Some(external_tx_id),
            None,
        )
        .await
    }

    pub async fn mark_failed(
        &self,
        id: PayoutRequestId,
        error_message: &str,
    ) -> Result<(), PayoutError> {
        self.transition(
            id,
            PayoutStatus::Processing,
            PayoutStatus::Failed,
            None,
            Some(error_message),
        )
        .await
    }

    #[instrument(name = "payout_requests.transition", skip(self, error_message), err)]
    async fn transition(
        &self,
        id: PayoutRequestId,
        expected: PayoutStatus,
        next: PayoutStatus,
        external_tx_id: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<(), PayoutError> {
        if !expected.can_transition_to(next) {
            return Err(PayoutError::InvalidTransition { id, expected, next });
        }
        let res = sqlx::query(
            r#"UPDATE faucet_payout_requests
               SET status = ?,
                   external_tx_id = COALESCE(?, external_tx_id),
                   error_message = ?,
                   updated_at = ?
               WHERE id = ? AND status = ?"#,
        )
        .bind(next.as_str())
        .bind(external_tx_id)
        .bind(error_message)
        .bind(Utc::now().timestamp_millis())
        .bind(Uuid::from(id))
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(PayoutError::InvalidTransition { id, expected, next });
        }
        Ok(())
    }

    /// Moves every `processing` record to `failed`. They are never put back to
    /// `pending`: the node may have accepted the transaction before the process
    /// went away.
    #[instrument(name = "payout_requests.fail_stuck_processing", skip(self, error_message), err)]
    pub async fn fail_stuck_processing(&self, error_message: &str) -> Result<u64, PayoutError> {
        let res = sqlx::query(
            r#"UPDATE faucet_payout_requests
               SET status = ?, error_message = ?, updated_at = ?
               WHERE status = ?"#,
        )
        .bind(PayoutStatus::Failed.as_str())
        .bind(error_message)
        .bind(Utc::now().timestamp_millis())
        .bind(PayoutStatus::Processing.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    pub async fn ping(&self) -> Result<(), PayoutError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
