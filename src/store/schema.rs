//! SQLite schema of the pronunciation database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Feedback log and per letter progress
// =============================================================================

/// Append-only log of scored attempts. Analysis snapshots are JSON text.
const PRONUNCIATION_FEEDBACK_TABLE_V1: Table = Table {
    name: "pronunciation_feedback",
    columns: &[
        sqlite_column!("id", SqlType::Text, is_primary_key = true),
        sqlite_column!("user_id", SqlType::Text, non_null = true),
        sqlite_column!("letter_id", SqlType::Integer, non_null = true),
        sqlite_column!("session_id", SqlType::Text, non_null = true),
        sqlite_column!("recorded_text", SqlType::Text),
        sqlite_column!("expected_text", SqlType::Text, non_null = true),
        sqlite_column!("confidence_score", SqlType::Real, non_null = true),
        sqlite_column!("pronunciation_accuracy", SqlType::Real, non_null = true),
        sqlite_column!("makhraj_analysis", SqlType::Text, non_null = true),
        sqlite_column!("sifat_analysis", SqlType::Text, non_null = true),
        sqlite_column!("detected_errors", SqlType::Text, non_null = true),
        sqlite_column!("correction_suggestions", SqlType::Text, non_null = true),
        sqlite_column!("audio_features", SqlType::Text, non_null = true),
        sqlite_column!("ai_model_used", SqlType::Text, non_null = true),
        sqlite_column!("processing_time_ms", SqlType::Integer, non_null = true),
        sqlite_column!("audio_quality_score", SqlType::Real, non_null = true),
        sqlite_column!("background_noise_level", SqlType::Real, non_null = true),
        sqlite_column!("created_at", SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_feedback_user_created", "user_id, created_at DESC"),
        ("idx_feedback_user_letter", "user_id, letter_id"),
        ("idx_feedback_session", "session_id"),
    ],
    unique_constraints: &[],
};

/// One row per user and letter, updated in place.
const PRONUNCIATION_PROGRESS_TABLE_V1: Table = Table {
    name: "pronunciation_progress",
    columns: &[
        sqlite_column!("id", SqlType::Integer, is_primary_key = true),
        sqlite_column!("user_id", SqlType::Text, non_null = true),
        sqlite_column!("letter_id", SqlType::Integer, non_null = true),
        sqlite_column!("total_attempts", SqlType::Integer, non_null = true),
        sqlite_column!("successful_attempts", SqlType::Integer, non_null = true),
        sqlite_column!("average_accuracy", SqlType::Real, non_null = true),
        sqlite_column!("best_accuracy", SqlType::Real, non_null = true),
        sqlite_column!("last_accuracy", SqlType::Real, non_null = true),
        sqlite_column!("improvement_rate", SqlType::Real, non_null = true),
        sqlite_column!("first_attempt_at", SqlType::Text, non_null = true),
        sqlite_column!("last_attempt_at", SqlType::Text, non_null = true),
        sqlite_column!("mastery_achieved_at", SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[&["user_id", "letter_id"]],
};

pub const PRONUNCIATION_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        PRONUNCIATION_FEEDBACK_TABLE_V1,
        PRONUNCIATION_PROGRESS_TABLE_V1,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn v1_schema_creates_and_validates() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = &PRONUNCIATION_VERSIONED_SCHEMAS[0];
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn progress_rows_are_unique_per_user_and_letter() {
        let conn = Connection::open_in_memory().unwrap();
        PRONUNCIATION_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        let insert = "INSERT INTO pronunciation_progress (user_id, letter_id, total_attempts, \
                      successful_attempts, average_accuracy, best_accuracy, last_accuracy, \
                      improvement_rate, first_attempt_at, last_attempt_at) \
                      VALUES ('u', 2, 1, 0, 50, 50, 50, 0, 'a', 'a')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
