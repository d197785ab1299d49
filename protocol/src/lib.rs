use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// ---- Cards ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Hearts,
    Diamonds,
    Spades,
    Clubs,
}

impl Suit {
    /// Dealing order used when a fresh pool is built.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Spades, Suit::Clubs];

    /// Single-letter wire code.
    pub fn code(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Spades => 'S',
            Suit::Clubs => 'C',
        }
    }

    pub fn from_code(c: char) -> Option<Suit> {
        match c {
            'H' => Some(Suit::Hearts),
            'D' => Some(Suit::Diamonds),
            'S' => Some(Suit::Spades),
            'C' => Some(Suit::Clubs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Comparison value, `2` through `14` for the ace.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn code(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::King => "K",
            Rank::Queen => "Q",
            Rank::Jack => "J",
            Rank::Ten => "10",
            Rank::Nine => "9",
            Rank::Eight => "8",
            Rank::Seven => "7",
            Rank::Six => "6",
            Rank::Five => "5",
            Rank::Four => "4",
            Rank::Three => "3",
            Rank::Two => "2",
        }
    }

    pub fn from_code(s: &str) -> Option<Rank> {
        Rank::ALL.iter().copied().find(|r| r.code() == s)
    }
}

/// A card travels on the wire as rank code followed by suit code, e.g. `"10H"`, `"AS"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn is_ace_of_hearts(&self) -> bool {
        self.rank == Rank::Ace && self.suit == Suit::Hearts
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.code(), self.suit.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a card: {0:?}")]
pub struct CardParseError(pub String);

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let suit = chars
            .next_back()
            .map(|c| c.to_ascii_uppercase())
            .and_then(Suit::from_code)
            .ok_or_else(|| CardParseError(s.to_string()))?;
        let rank = Rank::from_code(&chars.as_str().to_ascii_uppercase())
            .ok_or_else(|| CardParseError(s.to_string()))?;
        Ok(Card { rank, suit })
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

/// ---- Session state visible to every player ----
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Declaring,
    Playing,
    /// A trick has been resolved; the ready barrier gates what comes next.
    HandComplete,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicPlayer {
    pub name: String,
    pub is_admin: bool,
    pub cards_in_hand: usize,
    pub declared: Option<u32>,
    pub tricks_won: u32,
    pub score: u32,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrickPlay {
    pub player_name: String,
    pub card: Card,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreLine {
    pub player_name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub code: String,
    pub admin: String,
    pub player_count: usize,
    pub ceiling: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    SessionNotFound,
    PlayerNotFound,
    BlankName,
    DuplicateName,
    GameAlreadyStarted,
    InvalidDeclaration,
    NotYourTurn,
    LastPlayerRestriction,
    CannotPlayDuringDeclarations,
    InvalidCeiling,
    InsufficientCards,
    NotAdmin,
    NotEnoughPlayers,
    CardNotInHand,
    WrongPhase,
    MalformedMessage,
}

/// ---- Inbound events ----
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientToServer {
    CreateSession {
        player_name: String,
    },
    JoinSession {
        code: String,
        player_name: String,
    },
    SetHandSizeCeiling {
        code: String,
        player_name: String,
        ceiling: i64,
    },
    StartSession {
        code: String,
        player_name: String,
    },
    Declare {
        code: String,
        player_name: String,
        amount: i64,
    },
    PlayCard {
        code: String,
        player_name: String,
        card: Card,
    },
    Continue {
        code: String,
        player_name: String,
    },
    DestroySession {
        code: String,
        player_name: String,
    },
    ListSessions,
}

/// ---- Outbound events ----
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServerToClient {
    Hello {
        your_id: Uuid,
    },
    SessionCreated {
        code: String,
    },
    PlayerListUpdated {
        players: Vec<PublicPlayer>,
    },
    Joined {
        code: String,
        your_name: String,
        players: Vec<PublicPlayer>,
        ceiling: u32,
    },
    CeilingUpdated {
        ceiling: u32,
    },
    HandStarted {
        hand_number: u32,
        hand_size: u32,
        leader: String,
        your_hand: Vec<Card>,
    },
    DeclarationRecorded {
        player_name: String,
        amount: u32,
    },
    NextToDeclare {
        player_name: String,
    },
    DeclarationsComplete {
        leader: String,
    },
    CardPlayed {
        trick: Vec<TrickPlay>,
    },
    NextTurn {
        player_name: String,
        hand_number: u32,
    },
    HandUpdated {
        hand: Vec<Card>,
    },
    TrickFinished {
        winner: String,
        tricks_won: u32,
        trick: Vec<TrickPlay>,
    },
    HandReset {
        hand_number: u32,
        hand_size: u32,
        leader: String,
        your_hand: Vec<Card>,
        scoreboard: Vec<ScoreLine>,
    },
    WaitingForOthers {
        ready: usize,
        total: usize,
    },
    GameOver {
        winner: String,
        scoreboard: Vec<ScoreLine>,
    },
    SessionDestroyed {
        code: String,
        reason: String,
    },
    SessionList {
        sessions: Vec<SessionInfo>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}
