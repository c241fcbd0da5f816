use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed application pipeline states. Serialized as their display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Received,
    #[serde(rename = "Under Review")]
    UnderReview,
    Interview,
    #[serde(rename = "Offer Extended")]
    OfferExtended,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Received,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Interview,
        ApplicationStatus::OfferExtended,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Received => "Received",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::OfferExtended => "Offer Extended",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    /// Terminal states can no longer be withdrawn by the candidate.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::OfferExtended
                | ApplicationStatus::Rejected
                | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    /// Accepts the display string, case-insensitively, with `-`/`_` standing in for spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ").to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| format!("unknown application status '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    #[serde(rename = "applicationDate")]
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(rename = "coverLetter", default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_department: String,
    #[serde(default)]
    pub candidate: Option<i64>,
    #[serde(default)]
    pub job: Option<i64>,
}

impl Application {
    pub fn can_withdraw(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Body of `POST /applications/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    /// Omitted for candidates; the backend substitutes their linked record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<i64>,
    pub job: i64,
    pub status: ApplicationStatus,
    #[serde(rename = "coverLetter", skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

/// Query parameters of `GET /applications/`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<i64>,
}

impl ApplicationFilter {
    pub fn for_candidate(candidate_id: i64) -> Self {
        Self {
            candidate_id: Some(candidate_id),
            ..Default::default()
        }
    }

}

/// Number of applications per status. Statuses with no applications are absent.
pub fn status_counts(applications: &[Application]) -> BTreeMap<ApplicationStatus, usize> {
    applications.iter().fold(BTreeMap::new(), |mut acc, app| {
        *acc.entry(app.status).or_insert(0) += 1;
        acc
    })
}
