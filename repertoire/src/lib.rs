//! Opening repertoire engine: move trees per side, PGN import and export,
//! a browse view across repertoires, undo, training drills and the
//! versioned persistence codec.

pub mod collection;
pub mod history;
pub mod persistence;
pub mod pgn;
pub mod services;
pub mod side;
pub mod training;
pub mod tree;
pub mod workspace;

pub use collection::{
    normalize_name, BrowseOption, Collection, Deletion, RepertoireEntry, SideCollection,
    DEFAULT_NAME, UNTITLED_NAME,
};
pub use history::{UndoHistory, UndoSnapshot, UNDO_LIMIT};
pub use persistence::{
    DebouncedSaver, FileStore, KeyValueStore, Loaded, MemoryStore, PersistenceError, SaveEvent,
    Settings, StatsFilters, COLLECTION_KEY, SETTINGS_KEY,
};
pub use pgn::ImportSummary;
pub use services::{
    apply_popularity, AnalysisEvent, AnalysisLine, AnalysisPanel, AnalysisRequest, AnalysisScore,
    AnalysisWorker, PositionStats, RequestGate, ServiceError, StatisticsService, StatsLookup,
    Ticket,
};
pub use side::BySide;
pub use training::{AttemptOutcome, HintState, TrainingPhase, TrainingSession, MAX_AUTO_PLIES};
pub use tree::{resolve_line, MoveNode, MoveTree, TreeError, ROOT_ID};
pub use workspace::{BrowseStep, PlayOutcome, Workspace};
