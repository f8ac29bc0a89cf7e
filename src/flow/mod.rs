// src/flow/mod.rs
//! Location search flow: `Idle → Searching → Selected → (new click) → Searching`.
//!
//! The machine is plain data, independent of any UI binding. Overlapping
//! searches are resolved by a monotonically increasing generation counter:
//! `begin` issues a ticket, and `complete` discards any ticket that is no
//! longer current, so a slow stale response can never overwrite a newer
//! selection. There is no cancellation; a superseded request simply completes
//! into `Stale`.

use anyhow::Result;
use tracing::{info, warn};

use crate::geo::{select_nearest, Coordinate};
use crate::places::{Candidate, PlacesClient};

/// World view shown before anything is selected.
pub const WORLD_ZOOM: u8 = 2;
/// Zoom applied when the map centers on a selected candidate.
pub const SELECTED_ZOOM: u8 = 14;

/// Map camera/marker state the UI renders from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: Option<Coordinate>,
}

impl Default for MapFocus {
    fn default() -> Self {
        Self {
            center: Coordinate::new(0.0, 0.0),
            zoom: WORLD_ZOOM,
            marker: None,
        }
    }
}

/// Proof of a `begin` call; `complete` checks it is still the newest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    pub origin: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching { generation: u64 },
    Selected { subject: Candidate },
}

/// What a completion meant; `Selected` is the caller's cue to open chat.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The ticket was superseded by a newer click; nothing changed.
    Stale,
    /// Search succeeded with zero candidates; back to `Idle`, no chat.
    NoResults,
    /// Upstream failure; back to `Idle`. Non-fatal, the user may click again.
    Failed,
    /// A nearest candidate was chosen and the map focused on it.
    Selected { subject: Candidate },
}

pub struct SearchFlow {
    state: SearchState,
    generation: u64,
    focus: MapFocus,
}

impl Default for SearchFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchFlow {
    pub fn new() -> Self {
        Self {
            state: SearchState::Idle,
            generation: 0,
            focus: MapFocus::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn focus(&self) -> MapFocus {
        self.focus
    }

    /// The currently selected subject, if any.
    pub fn selected(&self) -> Option<&Candidate> {
        match &self.state {
            SearchState::Selected { subject } => Some(subject),
            _ => None,
        }
    }

    /// Register a click and move to `Searching`. Valid from any state; a
    /// click during `Searching` supersedes the outstanding request.
    pub fn begin(&mut self, origin: Coordinate) -> SearchTicket {
        self.generation += 1;
        self.state = SearchState::Searching { generation: self.generation };
        info!(%origin, generation = self.generation, "search started");
        SearchTicket { generation: self.generation, origin }
    }

    /// Apply a finished search. Stale tickets are discarded without touching
    /// state or focus.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Candidate>>,
    ) -> SearchEvent {
        if ticket.generation != self.generation {
            info!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale search result"
            );
            return SearchEvent::Stale;
        }

        let candidates = match outcome {
            Ok(candidates) => candidates,
            Err(cause) => {
                warn!(%cause, "nearby search failed");
                self.state = SearchState::Idle;
                return SearchEvent::Failed;
            }
        };

        let Some(subject) = select_nearest(ticket.origin, &candidates).cloned() else {
            self.state = SearchState::Idle;
            return SearchEvent::NoResults;
        };

        info!(subject = %subject.name, "nearest candidate selected");
        self.focus = MapFocus {
            center: subject.location,
            zoom: SELECTED_ZOOM,
            marker: Some(subject.location),
        };
        self.state = SearchState::Selected { subject: subject.clone() };
        SearchEvent::Selected { subject }
    }

    /// Convenience driver: begin, query the places upstream with the given
    /// defaults, complete. Holding `&mut self` across the await keeps sends
    /// sequential; overlap handling via tickets is exercised by callers that
    /// drive `begin`/`complete` themselves.
    pub async fn handle_click(
        &mut self,
        places: &PlacesClient,
        click: Coordinate,
        radius: u32,
        keyword: &str,
    ) -> SearchEvent {
        let ticket = self.begin(click);
        let outcome = places.search_nearby(click, radius, keyword).await;
        self.complete(ticket, outcome)
    }
}
