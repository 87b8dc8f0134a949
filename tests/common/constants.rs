//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (letter ids, user ids, etc.), update only this file.

#![allow(dead_code)]

// ============================================================================
// Test Users
// ============================================================================

/// Learner used by most tests
pub const TEST_USER_ID: &str = "user-e2e-1";

/// Second learner, for isolation checks
pub const OTHER_USER_ID: &str = "user-e2e-2";

/// Session id sent explicitly by clients that track sessions
pub const TEST_SESSION_ID: &str = "session-e2e";

// ============================================================================
// Letters
// ============================================================================

/// Alif
pub const LETTER_ALIF_ID: &str = "1";

/// Ba, the letter the fixed test features are tuned to
pub const LETTER_BA_ID: &str = "2";

/// Ta
pub const LETTER_TA_ID: &str = "3";

/// Not in the reference table
pub const UNKNOWN_LETTER_ID: &str = "99";

/// Number of letters in the built-in table
pub const LETTER_COUNT: usize = 28;

// ============================================================================
// Models
// ============================================================================

pub const ADVANCED_MODEL: &str = "advanced-nlp-makhraj-v1";
pub const FALLBACK_MODEL: &str = "fallback-system";
pub const EMERGENCY_MODEL: &str = "emergency-fallback";

// ============================================================================
// Server Limits
// ============================================================================

/// Upload limit configured on the test server
pub const TEST_MAX_UPLOAD_BYTES: usize = 256 * 1024;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server readiness (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Request timeout for HTTP client (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
