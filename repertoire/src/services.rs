//! Boundary to the asynchronous collaborators: the analysis worker and the
//! opening statistics service.
//!
//! Both are queried for "the current position", which changes while a
//! request is in flight. Every request takes a [`Ticket`] from a shared
//! [`RequestGate`]; a response is applied only if no newer ticket has been
//! issued since, so superseded answers are dropped instead of shown.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::persistence::StatsFilters;
use crate::tree::MoveTree;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Proof that a request was issued at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Monotonic generation counter shared by everything that may supersede a
/// request.
#[derive(Debug, Default)]
pub struct RequestGate {
    generation: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket.
    pub fn issue(&self) -> Ticket {
        Ticket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Invalidate outstanding tickets without starting a request.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }
}

/// Engine evaluation from white's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisScore {
    Centipawns(i32),
    /// Mate in n moves; negative when black mates.
    Mate(i32),
}

impl fmt::Display for AnalysisScore {
    /// The annotation text attached to nodes: `+0.35`, `-1.20`, `#3`, `#-3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Centipawns(cp) => {
                let sign = if cp < 0 { '-' } else { '+' };
                let abs = cp.unsigned_abs();
                write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
            }
            Self::Mate(n) => write!(f, "#{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub position: String,
    pub depth: u32,
    pub lines: u32,
}

/// One ranked principal variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLine {
    /// 1 for the best line.
    pub rank: u32,
    pub best_move: String,
    pub score: AnalysisScore,
    pub pv: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    Line(AnalysisLine),
    Complete,
}

/// A chess engine running somewhere else.
pub trait AnalysisWorker: Send + Sync {
    /// Start analysing; lines stream on the returned channel until
    /// [`AnalysisEvent::Complete`] or until `stop` is called.
    fn analyze(&self, request: AnalysisRequest) -> mpsc::UnboundedReceiver<AnalysisEvent>;

    fn stop(&self);
}

/// Analysis shown for the current position. Lines are kept by rank and
/// replaced as deeper results stream in.
#[derive(Debug)]
pub struct AnalysisPanel {
    gate: Arc<RequestGate>,
    ticket: Option<Ticket>,
    position: Option<String>,
    lines: BTreeMap<u32, AnalysisLine>,
    complete: bool,
}

impl AnalysisPanel {
    pub fn new(gate: Arc<RequestGate>) -> Self {
        Self {
            gate,
            ticket: None,
            position: None,
            lines: BTreeMap::new(),
            complete: false,
        }
    }

    /// Switch to `position`, discarding lines of the previous one.
    pub fn request(&mut self, position: &str, depth: u32, lines: u32) -> (Ticket, AnalysisRequest) {
        let ticket = self.gate.issue();
        self.ticket = Some(ticket);
        self.position = Some(position.to_string());
        self.lines.clear();
        self.complete = false;
        let request = AnalysisRequest {
            position: position.to_string(),
            depth,
            lines,
        };
        (ticket, request)
    }

    /// Apply a streamed event. Returns false when the ticket is stale and
    /// the event was dropped.
    pub fn apply(&mut self, ticket: Ticket, event: AnalysisEvent) -> bool {
        if self.ticket != Some(ticket) || !self.gate.is_current(&ticket) {
            tracing::debug!("Dropping stale analysis event");
            return false;
        }
        match event {
            AnalysisEvent::Line(line) => {
                self.lines.insert(line.rank, line);
            }
            AnalysisEvent::Complete => self.complete = true,
        }
        true
    }

    /// Query `worker` and collect its lines until completion. Stops the
    /// worker and returns false as soon as the request is superseded.
    pub async fn run<W: AnalysisWorker>(
        &mut self,
        worker: &W,
        position: &str,
        depth: u32,
        lines: u32,
    ) -> bool {
        let (ticket, request) = self.request(position, depth, lines);
        let mut rx = worker.analyze(request);
        while let Some(event) = rx.recv().await {
            let done = event == AnalysisEvent::Complete;
            if !self.apply(ticket, event) {
                worker.stop();
                return false;
            }
            if done {
                return true;
            }
        }
        self.complete
    }

    pub fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }

    pub fn lines(&self) -> impl Iterator<Item = &AnalysisLine> {
        self.lines.values()
    }

    pub fn best(&self) -> Option<&AnalysisLine> {
        self.lines.values().next()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Game counts by result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultTotals {
    pub white: u64,
    pub draws: u64,
    pub black: u64,
}

impl ResultTotals {
    pub fn games(&self) -> u64 {
        self.white.saturating_add(self.draws).saturating_add(self.black)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStats {
    pub move_code: String,
    pub notation: String,
    pub totals: ResultTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionStats {
    pub opening_name: Option<String>,
    pub totals: ResultTotals,
    pub moves: Vec<MoveStats>,
}

/// Aggregate outcome and move popularity data for positions.
pub trait StatisticsService: Send + Sync {
    fn lookup(
        &self,
        position: &str,
        filters: &StatsFilters,
    ) -> impl Future<Output = Result<PositionStats, ServiceError>> + Send;
}

/// Statistics for the current position, dropping superseded answers.
pub struct StatsLookup<S> {
    service: S,
    gate: Arc<RequestGate>,
}

impl<S: StatisticsService> StatsLookup<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            gate: Arc::new(RequestGate::new()),
        }
    }

    pub fn gate(&self) -> &Arc<RequestGate> {
        &self.gate
    }

    /// `Ok(None)` means a newer lookup started before this one answered.
    pub async fn fetch(
        &self,
        position: &str,
        filters: &StatsFilters,
    ) -> Result<Option<PositionStats>, ServiceError> {
        let ticket = self.gate.issue();
        let stats = self.service.lookup(position, filters).await?;
        if !self.gate.is_current(&ticket) {
            tracing::debug!(%position, "Dropping stale statistics response");
            return Ok(None);
        }
        Ok(Some(stats))
    }
}

/// Reorder the children of `node_id` by descending game count. Children
/// absent from `stats` keep their relative order after the known ones.
pub fn apply_popularity(tree: &mut MoveTree, node_id: &str, stats: &PositionStats) -> bool {
    let mut ranked: Vec<&MoveStats> = stats.moves.iter().collect();
    ranked.sort_by(|a, b| b.totals.games().cmp(&a.totals.games()));
    let preferred: Vec<String> = ranked.into_iter().map(|m| m.move_code.clone()).collect();
    tree.reorder_children(node_id, &preferred)
}
