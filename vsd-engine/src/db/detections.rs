//! Promoted detection persistence

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::Detection;
use vsd_common::{Error, Result};

/// One promoted detection as stored
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRow {
    pub id: i64,
    pub session_id: Uuid,
    pub category: String,
    pub max_confidence: f64,
    pub details: Vec<Detection>,
    pub screenshot_path: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// Record a promoted detection, returning its row id
pub async fn insert_detection(
    pool: &SqlitePool,
    session_id: Uuid,
    category: &str,
    max_confidence: f64,
    details: &[Detection],
    screenshot_path: Option<&str>,
    detected_at: DateTime<Utc>,
) -> Result<i64> {
    let details = serde_json::to_string(details)
        .map_err(|e| Error::Internal(format!("Failed to serialize detection details: {}", e)))?;

    let result = sqlx::query(
        r#"
        INSERT INTO detections (
            session_id, category, max_confidence, details, screenshot_path, detected_at
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session_id.to_string())
    .bind(category)
    .bind(max_confidence)
    .bind(details)
    .bind(screenshot_path)
    .bind(detected_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent promoted detections, newest first
///
/// `session_id = None` lists across all sessions.
pub async fn recent_detections(
    pool: &SqlitePool,
    session_id: Option<Uuid>,
    limit: u32,
) -> Result<Vec<DetectionRow>> {
    let rows = match session_id {
        Some(session_id) => {
            sqlx::query(
                r#"
                SELECT id, session_id, category, max_confidence, details, screenshot_path, detected_at
                FROM detections
                WHERE session_id = ?
                ORDER BY id DESC
                LIMIT ?
                "#,
            )
            .bind(session_id.to_string())
            .bind(limit as i64)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, session_id, category, max_confidence, details, screenshot_path, detected_at
                FROM detections
                ORDER BY id DESC
                LIMIT ?
                "#,
            )
            .bind(limit as i64)
            .fetch_all(pool)
            .await?
        }
    };

    let mut detections = Vec::with_capacity(rows.len());
    for row in rows {
        let session_id_str: String = row.get("session_id");
        let session_id = Uuid::parse_str(&session_id_str)
            .map_err(|e| Error::Internal(format!("Failed to parse session_id: {}", e)))?;

        let details: String = row.get("details");
        let details: Vec<Detection> = serde_json::from_str(&details)
            .map_err(|e| Error::Internal(format!("Failed to deserialize details: {}", e)))?;

        let detected_at: String = row.get("detected_at");
        let detected_at = DateTime::parse_from_rfc3339(&detected_at)
            .map_err(|e| Error::Internal(format!("Failed to parse detected_at: {}", e)))?
            .with_timezone(&Utc);

        detections.push(DetectionRow {
            id: row.get("id"),
            session_id,
            category: row.get("category"),
            max_confidence: row.get("max_confidence"),
            details,
            screenshot_path: row.get("screenshot_path"),
            detected_at,
        });
    }

    Ok(detections)
}
