mod movie;
mod session;
mod user;

pub use movie::{
    LibraryAddOutcome, LibraryItem, LibraryMovie, Movie, MoviePage, Recommendation, TmdbId,
};
pub use session::{Session, SessionStatus};
pub use user::{LoginRequest, RegisterRequest, User, UserSummary};
