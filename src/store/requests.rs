//! Append-only log of language requests

use super::{KvStore, LanguageRequest, RequestStatus, StoreResult, LANGUAGE_REQUESTS_KEY};
use chrono::Utc;

#[derive(Clone)]
pub struct RequestStore {
    kv: KvStore,
}

impl RequestStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// All requests in submission order. Unreadable data counts as empty.
    pub fn all(&self) -> Vec<LanguageRequest> {
        self.kv.load_or_default(LANGUAGE_REQUESTS_KEY)
    }

    /// Append a new pending request
    pub fn append(&self, language: &str, email: &str, notes: &str) -> StoreResult<LanguageRequest> {
        let request = LanguageRequest {
            id: uuid::Uuid::new_v4().to_string(),
            language: language.to_string(),
            email: email.to_string(),
            notes: notes.to_string(),
            timestamp: Utc::now(),
            status: RequestStatus::Pending,
        };

        let mut requests = self.all();
        requests.push(request.clone());
        self.kv.put_json(LANGUAGE_REQUESTS_KEY, &requests)?;
        Ok(request)
    }
}
