use tricktaker_protocol::{ErrorKind, ServerToClient};

/// Every way a session command can be refused. None of these are fatal: the
/// sender is told, the session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Session not found!")]
    SessionNotFound,
    #[error("Player not found!")]
    PlayerNotFound,
    #[error("Name cannot be blank!")]
    BlankName,
    #[error("Player name already exists.")]
    DuplicateName,
    #[error("Game has already started.")]
    GameAlreadyStarted,
    #[error("Invalid declaration: must be between 0 and {max}.")]
    InvalidDeclaration { max: u32 },
    #[error("It's not your turn!")]
    NotYourTurn,
    #[error("Your declaration cannot make the total equal to the number of cards in this hand ({hand_size}).")]
    LastPlayerRestriction { hand_size: u32 },
    #[error("Cannot play cards during declarations phase!")]
    CannotPlayDuringDeclarations,
    #[error("Invalid ceiling {0}: must be an odd number between 1 and {max}.", max = crate::hand_size::MAX_CEILING)]
    InvalidCeiling(i64),
    #[error("Not enough cards left to deal: need {needed}, have {available}.")]
    InsufficientCards { needed: usize, available: usize },
    #[error("Only the session admin can do that.")]
    NotAdmin,
    #[error("Need at least {min} players to start.", min = crate::lifecycle::MIN_PLAYERS)]
    NotEnoughPlayers,
    #[error("You do not hold {0}.")]
    CardNotInHand(String),
    #[error("That action is not allowed right now.")]
    WrongPhase,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::SessionNotFound => ErrorKind::SessionNotFound,
            GameError::PlayerNotFound => ErrorKind::PlayerNotFound,
            GameError::BlankName => ErrorKind::BlankName,
            GameError::DuplicateName => ErrorKind::DuplicateName,
            GameError::GameAlreadyStarted => ErrorKind::GameAlreadyStarted,
            GameError::InvalidDeclaration { .. } => ErrorKind::InvalidDeclaration,
            GameError::NotYourTurn => ErrorKind::NotYourTurn,
            GameError::LastPlayerRestriction { .. } => ErrorKind::LastPlayerRestriction,
            GameError::CannotPlayDuringDeclarations => ErrorKind::CannotPlayDuringDeclarations,
            GameError::InvalidCeiling(_) => ErrorKind::InvalidCeiling,
            GameError::InsufficientCards { .. } => ErrorKind::InsufficientCards,
            GameError::NotAdmin => ErrorKind::NotAdmin,
            GameError::NotEnoughPlayers => ErrorKind::NotEnoughPlayers,
            GameError::CardNotInHand(_) => ErrorKind::CardNotInHand,
            GameError::WrongPhase => ErrorKind::WrongPhase,
        }
    }

    pub fn to_message(&self) -> ServerToClient {
        ServerToClient::Error {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
