use std::fmt;

use tracing::info;

use crate::api_client::RecruitingApi;
use crate::errors::{ClientError, ClientResult};
use crate::models::{Candidate, NewCandidate};
use crate::screens::{mutation_failed, refetched, Loadable, LOADING};

/// The talent pool.
#[derive(Debug, Default)]
pub struct CandidatesScreen {
    pub candidates: Loadable<Vec<Candidate>>,
}

impl CandidatesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let result = api.list_candidates().await;
        self.candidates.settle("fetching candidates", result)
    }

    pub async fn create(
        &mut self,
        api: &dyn RecruitingApi,
        new_candidate: NewCandidate,
    ) -> ClientResult<()> {
        for (field, value) in [
            ("first name", &new_candidate.first_name),
            ("last name", &new_candidate.last_name),
            ("email", &new_candidate.email),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::MissingField(field));
            }
        }
        let created = mutation_failed(
            "creating candidate",
            api.create_candidate(&new_candidate).await,
        )?;
        info!("Added candidate {} to the talent pool", created.id);
        refetched(self.load(api).await)
    }

    /// The candidate to open a profile for.
    pub fn select(&self, id: i64) -> Option<&Candidate> {
        self.candidates.get()?.iter().find(|c| c.id == id)
    }
}

impl fmt::Display for CandidatesScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Talent Pool ==")?;
        let Some(candidates) = self.candidates.get() else {
            return writeln!(f, "{LOADING}");
        };
        writeln!(f, "{} candidates", candidates.len())?;
        for c in candidates {
            writeln!(f, "  #{:<4} {:<24} {:<28} {}", c.id, c.full_name(), c.email, c.phone)?;
        }
        Ok(())
    }
}
