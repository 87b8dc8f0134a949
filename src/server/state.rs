use axum::extract::FromRef;

use crate::analysis::PronunciationAnalyzer;
use crate::letters::LetterTable;
use crate::store::PronunciationStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedAnalyzer = Arc<PronunciationAnalyzer>;
pub type GuardedPronunciationStore = Arc<dyn PronunciationStore>;
pub type GuardedLetterTable = Arc<LetterTable>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub analyzer: GuardedAnalyzer,
    pub store: GuardedPronunciationStore,
    pub letters: GuardedLetterTable,
}

impl FromRef<ServerState> for GuardedAnalyzer {
    fn from_ref(input: &ServerState) -> Self {
        input.analyzer.clone()
    }
}

impl FromRef<ServerState> for GuardedPronunciationStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedLetterTable {
    fn from_ref(input: &ServerState) -> Self {
        input.letters.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
