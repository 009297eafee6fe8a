//! Workflow kind: the enumerated category identifying which external
//! workflow a dispatch (and its job, if any) belongs to.
//!
//! Kinds travel over the wire in snake_case and key the
//! `webhook_destinations` configuration table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External workflow category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Knowledge-base chat assistant turn.
    Chat,
    /// Knowledge-base file ingestion.
    FileUpload,
    /// Google Drive document ingestion.
    GoogleDrive,
    /// Lead batch validation.
    LeadValidation,
    /// Lead batch push to Salesforce.
    SalesforceSync,
    /// Reddit thread fetch-and-analyze.
    RedditFetch,
}

impl Kind {
    /// The snake_case wire name, also used as the destination key.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Chat => "chat",
            Kind::FileUpload => "file_upload",
            Kind::GoogleDrive => "google_drive",
            Kind::LeadValidation => "lead_validation",
            Kind::SalesforceSync => "salesforce_sync",
            Kind::RedditFetch => "reddit_fetch",
        }
    }

    /// Whether a dispatch of this kind is tracked by a job row.
    ///
    /// Untracked kinds return their result inline and never touch the
    /// jobs table.
    pub fn creates_job(self) -> bool {
        !matches!(self, Kind::RedditFetch)
    }

    /// Whether the external workflow answers with the final result in
    /// the dispatch response itself.
    ///
    /// Synchronous kinds have their job completed by the dispatcher
    /// immediately after a successful response; asynchronous kinds are
    /// finalized later by the callback receiver.
    pub fn is_synchronous(self) -> bool {
        matches!(self, Kind::LeadValidation | Kind::SalesforceSync)
    }

    /// All known kinds, in wire-name order.
    pub const ALL: [Kind; 6] = [
        Kind::Chat,
        Kind::FileUpload,
        Kind::GoogleDrive,
        Kind::LeadValidation,
        Kind::SalesforceSync,
        Kind::RedditFetch,
    ];
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Kind::Chat),
            "file_upload" => Ok(Kind::FileUpload),
            "google_drive" => Ok(Kind::GoogleDrive),
            "lead_validation" => Ok(Kind::LeadValidation),
            "salesforce_sync" => Ok(Kind::SalesforceSync),
            "reddit_fetch" => Ok(Kind::RedditFetch),
            other => Err(format!("unknown workflow kind '{other}'")),
        }
    }
}
