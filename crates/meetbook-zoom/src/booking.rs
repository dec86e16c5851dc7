//! Multi-account booking orchestration.
//!
//! The scheduler walks the configured account pool in declaration order and
//! takes the first account that is reachable, conflict-free and accepts the
//! creation call (first-fit, never best-fit). When the pool is exhausted it
//! falls back to scanning the daily slot grid for alternatives.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use meetbook_core::{ConflictWindow, MeetingRequest, SlotGrid};

use crate::client::{MeetingDetails, MeetingPayload, ZoomApi};
use crate::config::{ZoomAccount, ZoomConfig};
use crate::error::{Diagnostics, Stage, ZoomError, ZoomResult};
use crate::token::TokenCache;

/// A successfully booked meeting with its hosting account.
#[derive(Debug, Clone)]
pub struct BookedMeeting {
    /// Creation response from the provider.
    pub details: MeetingDetails,
    /// Email of the account the meeting was created on.
    pub account: String,
}

/// Result of a booking attempt across the whole pool.
#[derive(Debug)]
pub enum BookingOutcome {
    /// The first free account accepted the meeting.
    Booked(BookedMeeting),
    /// No account could host the requested slot.
    Unavailable {
        /// Free `HH:MM` slots found on the requested date, ascending. May be
        /// empty when the whole day is taken.
        alternatives: Vec<String>,
        /// One failure record per attempted account.
        diagnostics: Diagnostics,
    },
}

impl BookingOutcome {
    /// Returns the booked meeting, if any.
    pub fn booked(&self) -> Option<&BookedMeeting> {
        match self {
            Self::Booked(meeting) => Some(meeting),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Books meetings across a pool of provider accounts.
///
/// Owns the token cache and the REST client. One scheduler instance serves
/// the whole process; requests are handled one at a time, but the cache is
/// still mutex-guarded because everything runs on one async runtime.
#[derive(Debug)]
pub struct ZoomScheduler {
    config: ZoomConfig,
    api: ZoomApi,
    tokens: TokenCache,
}

impl ZoomScheduler {
    /// Creates a scheduler from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when the account pool is empty or an account has incomplete
    /// credentials.
    pub fn new(config: ZoomConfig) -> ZoomResult<Self> {
        config.validate()?;
        let api = ZoomApi::new(&config.api_base, &config.token_url);
        Ok(Self {
            config,
            api,
            tokens: TokenCache::new(),
        })
    }

    /// Returns the scheduler configuration.
    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub(crate) fn api(&self) -> &ZoomApi {
        &self.api
    }

    pub(crate) fn account_by_email(&self, email: &str) -> ZoomResult<&ZoomAccount> {
        self.config
            .accounts
            .iter()
            .find(|account| account.email == email)
            .ok_or_else(|| ZoomError::UnknownAccount(email.to_string()))
    }

    /// Returns a usable access token for an account, exchanging a fresh one
    /// when the cache has nothing valid for more than five minutes.
    pub async fn access_token(&self, account: &ZoomAccount) -> ZoomResult<String> {
        account.validate()?;
        if let Some(token) = self.tokens.get(&account.email).await {
            return Ok(token);
        }

        info!(account = %account.email, "requesting new access token");
        let response = self.api.exchange_token(account).await?;
        let Some(token) = response.access_token else {
            return Err(ZoomError::InvalidResponse(format!(
                "access token missing for {}",
                account.email
            )));
        };
        self.tokens
            .insert(&account.email, token.clone(), response.expires_in)
            .await;
        Ok(token)
    }

    /// Checks whether an account is free around the requested slot.
    ///
    /// Fetches the account's full meeting list and tests every entry against
    /// the padded conflict window, short-circuiting on the first hit.
    /// Transport failures propagate; the caller treats them as unavailable
    /// (inability to verify is not availability).
    pub async fn check_availability(
        &self,
        account: &ZoomAccount,
        token: &str,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> ZoomResult<bool> {
        let meetings = self.api.list_meetings(&account.email, token).await?;
        let window = ConflictWindow::around(start, duration_minutes);

        for meeting in meetings {
            let Some(meeting_start) = meeting.start_time else {
                continue;
            };
            if window.conflicts_with_duration(meeting_start, meeting.duration) {
                debug!(account = %account.email, "time conflict detected");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Books a meeting on the first free account.
    ///
    /// Walks the pool in declaration order: token, availability, creation.
    /// Each per-account failure is recorded and the walk continues. On
    /// exhaustion the daily grid is scanned for alternative slots on
    /// `requested_date`.
    ///
    /// # Errors
    ///
    /// Only local validation fails hard (non-positive duration); no remote
    /// call has been made at that point.
    pub async fn book_meeting(
        &self,
        request: &MeetingRequest,
        requested_date: NaiveDate,
    ) -> ZoomResult<BookingOutcome> {
        if request.duration_minutes <= 0 {
            return Err(ZoomError::Configuration(format!(
                "invalid meeting duration: {}",
                request.duration_minutes
            )));
        }

        let payload = MeetingPayload::from_request(request, self.config.timezone.name());
        let mut diagnostics = Diagnostics::new();

        for account in &self.config.accounts {
            info!(account = %account.email, "attempting booking");

            let token = match self.access_token(account).await {
                Ok(token) => token,
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Token, e.to_string());
                    continue;
                }
            };

            match self
                .check_availability(account, &token, request.start_time, request.duration_minutes)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    diagnostics.push(&account.email, Stage::Availability, "time conflict");
                    continue;
                }
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Availability, e.to_string());
                    continue;
                }
            }

            match self.api.create_meeting(&account.email, &token, &payload).await {
                Ok(details) => {
                    info!(account = %account.email, meeting_id = details.id, "meeting booked");
                    return Ok(BookingOutcome::Booked(BookedMeeting {
                        details,
                        account: account.email.clone(),
                    }));
                }
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Create, e.to_string());
                }
            }
        }

        warn!(failures = diagnostics.len(), "booking failed on every account");
        let alternatives = self
            .find_alternative_slots(requested_date, request.duration_minutes)
            .await;
        Ok(BookingOutcome::Unavailable {
            alternatives,
            diagnostics,
        })
    }

    /// Scans the daily grid for slots some account could still host.
    ///
    /// For each of the 26 candidates (ascending) the pool is probed in
    /// declaration order; the first reachable, conflict-free account
    /// witnesses the slot and the scan moves on. This is the slow path taken
    /// only after a failed booking: up to `26 x N` remote checks, with token
    /// exchanges amortized by the cache.
    pub async fn find_alternative_slots(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Vec<String> {
        info!(%date, duration_minutes, "scanning for alternative slots");
        let grid = SlotGrid::new(self.config.timezone);
        let mut available = Vec::new();

        for slot in SlotGrid::slots() {
            let Some(start) = grid.slot_to_utc(date, slot) else {
                continue;
            };
            for account in &self.config.accounts {
                let Ok(token) = self.access_token(account).await else {
                    continue;
                };
                if matches!(
                    self.check_availability(account, &token, start, duration_minutes)
                        .await,
                    Ok(true)
                ) {
                    available.push(SlotGrid::label(slot));
                    break;
                }
            }
        }

        if available.is_empty() {
            warn!(%date, "no free slots found for the whole day");
        }
        available
    }

    /// Deletes a meeting by its join link.
    ///
    /// Probes every account in order; the first HTTP 204 wins and that
    /// account's email is returned.
    ///
    /// # Errors
    ///
    /// [`ZoomError::InvalidLink`] when the link carries no meeting id,
    /// [`ZoomError::AllAccountsFailed`] when no account owned the meeting.
    pub async fn delete_meeting(&self, link: &str) -> ZoomResult<String> {
        let meeting_id = meetbook_core::extract_meeting_id(link)
            .ok_or_else(|| ZoomError::InvalidLink(link.to_string()))?;
        info!(meeting_id, "deleting meeting");

        let mut diagnostics = Diagnostics::new();
        for account in &self.config.accounts {
            let token = match self.access_token(account).await {
                Ok(token) => token,
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Token, e.to_string());
                    continue;
                }
            };

            match self.api.delete_meeting(&meeting_id, &token).await {
                Ok(true) => {
                    info!(account = %account.email, meeting_id, "meeting deleted");
                    return Ok(account.email.clone());
                }
                Ok(false) => {
                    diagnostics.push(
                        &account.email,
                        Stage::Delete,
                        "meeting not owned by this account",
                    );
                }
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Delete, e.to_string());
                }
            }
        }

        warn!(meeting_id, "meeting not deleted on any account");
        Err(ZoomError::AllAccountsFailed(diagnostics))
    }
}
