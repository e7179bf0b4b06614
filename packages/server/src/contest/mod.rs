mod lifecycle;
mod repository;

pub use lifecycle::{ContestService, ParticipationStats};
pub use repository::{
    ContestDocument, ContestFilter, ContestPatch, ContestRepository, NewContest, NewParticipant,
    WinnerRecord,
};
