use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::{collections::HashMap, sync::Arc};
use tricktaker_protocol::{Phase, SessionInfo};

use crate::error::{GameError, GameResult};
use crate::session::{Player, Session};

pub const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub type SessionRef = Arc<Mutex<Session>>;

/// Registry of live sessions keyed by join code.
///
/// The map lock is only held long enough to find a session; each session has
/// its own mutex so commands for different sessions never wait on each other.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionRef>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new lobby with `admin` as its only player and returns its code.
    pub fn create(&self, admin: Player) -> GameResult<String> {
        if admin.name.trim().is_empty() {
            return Err(GameError::BlankName);
        }
        let mut sessions = self.sessions.write();
        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = generate_code(&mut rng);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(code.clone(), admin);
        sessions.insert(code.clone(), Arc::new(Mutex::new(session)));
        Ok(code)
    }

    pub fn get(&self, code: &str) -> GameResult<SessionRef> {
        self.sessions
            .read()
            .get(code)
            .cloned()
            .ok_or(GameError::SessionNotFound)
    }

    /// Runs `f` against the session while holding only that session's lock.
    pub fn with_session<T>(
        &self,
        code: &str,
        f: impl FnOnce(&mut Session) -> GameResult<T>,
    ) -> GameResult<T> {
        let session = self.get(code)?;
        let mut guard = session.lock();
        f(&mut guard)
    }

    pub fn destroy(&self, code: &str) -> Option<SessionRef> {
        self.sessions.write().remove(code)
    }

    /// Sessions that can still be joined.
    pub fn list_open(&self) -> Vec<SessionInfo> {
        let refs: Vec<SessionRef> = self.sessions.read().values().cloned().collect();
        let mut open: Vec<SessionInfo> = refs
            .iter()
            .filter_map(|s| {
                let s = s.lock();
                (s.phase == Phase::Lobby).then(|| s.info())
            })
            .collect();
        open.sort_by(|a, b| a.code.cmp(&b.code));
        open
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
