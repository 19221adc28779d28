use crate::commitment::{Commitment, CommitmentScheme, MoveCommitmentScheme, MoveOpening, SecretHash};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{GameUpdate, UpdateNotifier};
use crate::game::{winning_role, Game, Move, Role, Status, Winner};
use crate::ledger::{Address, Ledger};
use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// The wagering engine: balance ledger, game registry, commit-reveal
/// verification and resolution, behind one owner-controlled pause flag.
///
/// Every entry point is a synchronous check-then-mutate transition.
/// Each game is its own lockable unit and the ledger is a single
/// serialized path; lock order is always game before ledger, so
/// unrelated games proceed concurrently and same-game calls are
/// strictly ordered.
pub struct GameEngine {
    config: EngineConfig,
    owner: Address,
    reveal_window: Duration,
    paused: AtomicBool,
    ledger: Mutex<Ledger>,
    games: RwLock<HashMap<u64, Arc<Mutex<Game>>>>,
    next_id: AtomicU64,
    notifier: UpdateNotifier,
}

impl GameEngine {
    pub fn new(config: EngineConfig, owner: Address) -> Result<Self> {
        config.validate()?;
        let reveal_window = Duration::from_std(config.reveal_window)
            .map_err(|e| EngineError::config(format!("reveal window out of range: {e}")))?;

        tracing::info!(
            minimum_wager = config.minimum_wager,
            owner = %owner,
            "game engine initialized"
        );

        Ok(Self {
            notifier: UpdateNotifier::new(config.event_capacity),
            config,
            owner,
            reveal_window,
            paused: AtomicBool::new(false),
            ledger: Mutex::new(Ledger::new()),
            games: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    // ---- ledger boundary ----

    /// Credits `amount` to `account`. Blocked while paused.
    pub fn deposit(&self, account: &Address, amount: u64) -> Result<u64> {
        self.ensure_not_paused()?;
        let balance = self.ledger.lock().deposit(account, amount)?;
        tracing::info!(%account, amount, balance, "deposit");
        Ok(balance)
    }

    /// Debits `amount` from `account`. An exit path: stays available
    /// while paused so funds cannot be stranded.
    pub fn withdraw(&self, account: &Address, amount: u64) -> Result<u64> {
        let balance = self.ledger.lock().withdraw(account, amount)?;
        tracing::info!(%account, amount, balance, "withdrawal");
        Ok(balance)
    }

    // ---- game lifecycle ----

    /// Locks `wager` from the caller and opens a new game around their
    /// commitment. Returns the stored record.
    pub fn create_game(&self, caller: &Address, commitment: Commitment, wager: u64) -> Result<Game> {
        self.ensure_not_paused()?;
        if wager < self.config.minimum_wager {
            return Err(EngineError::BelowMinimumWager {
                wager,
                minimum: self.config.minimum_wager,
            });
        }

        self.ledger.lock().escrow(caller, wager)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let game = Game::new(id, caller.clone(), commitment, wager, Utc::now());
        self.games
            .write()
            .insert(id, Arc::new(Mutex::new(game.clone())));

        tracing::info!(game_id = id, creator = %caller, wager, "game created");
        self.notifier.notify(&game);
        Ok(game)
    }

    /// Creator-only teardown of a game nobody has joined. Refunds the
    /// escrowed wager. Stays available while paused.
    pub fn cancel_game(&self, caller: &Address, id: u64) -> Result<Game> {
        let slot = self.game_slot(id)?;
        let mut game = slot.lock();

        if *caller != game.creator {
            return Err(EngineError::NotCreator);
        }
        if game.status.is_terminal() {
            return Err(EngineError::GameNotActive);
        }
        if game.status != Status::Open {
            return Err(EngineError::GameNotOpen);
        }

        self.ledger.lock().release(&game.creator, game.wager);
        game.status = Status::Cancelled;

        tracing::info!(game_id = id, "game cancelled");
        self.notifier.notify(&game);
        Ok(game.clone())
    }

    /// Joins an open game with a matching stake, starting the reveal
    /// window for both parties.
    pub fn join_game(&self, caller: &Address, commitment: Commitment, id: u64) -> Result<Game> {
        self.ensure_not_paused()?;
        let slot = self.game_slot(id)?;
        let mut game = slot.lock();

        if game.status != Status::Open {
            return Err(EngineError::GameNotOpen);
        }
        if *caller == game.creator {
            return Err(EngineError::CannotJoinOwnGame);
        }

        self.ledger.lock().escrow(caller, game.wager)?;

        let now = Utc::now();
        game.challenger = Some(caller.clone());
        game.challenger_commitment = Some(commitment);
        game.status = Status::AwaitingReveals;
        game.reveal_deadline = Some(now + self.reveal_window);

        tracing::info!(game_id = id, challenger = %caller, "challenger joined");
        self.notifier.notify(&game);
        Ok(game.clone())
    }

    /// Verifies the caller's `(move, secret hash)` against their stored
    /// commitment and records the move. Only the game's two
    /// participants may call it. When the second reveal lands the game
    /// resolves immediately. If the reveal deadline has already lapsed
    /// the call finalizes the expiry instead and returns the expired
    /// record.
    pub fn reveal_move(
        &self,
        caller: &Address,
        mv: Move,
        secret_hash: SecretHash,
        id: u64,
    ) -> Result<Game> {
        let slot = self.game_slot(id)?;
        let mut game = slot.lock();

        if game.status.is_terminal() {
            return Err(EngineError::GameNotActive);
        }
        if game.status == Status::Open {
            return Err(EngineError::GameNotOpen);
        }

        let role = game.role_of(caller).ok_or(EngineError::Unauthorized)?;
        if game.is_expired_at(Utc::now()) {
            self.finalize_expired(&mut game);
            self.notifier.notify(&game);
            return Ok(game.clone());
        }
        if game.move_of(role).is_some() {
            return Err(EngineError::AlreadyRevealed);
        }

        let stored = game
            .commitment_of(role)
            .ok_or(EngineError::InvalidReveal)?;
        let opening = MoveOpening::new(mv, caller.clone(), secret_hash);
        if !MoveCommitmentScheme::verify(&stored, &opening) {
            return Err(EngineError::InvalidReveal);
        }

        game.record_move(role, mv);
        tracing::info!(game_id = id, player = %caller, ?mv, "move revealed");

        match (game.creator_move, game.challenger_move) {
            (Some(creator_mv), Some(challenger_mv)) => {
                self.resolve(&mut game, creator_mv, challenger_mv)
            }
            _ => {
                game.status = match role.other() {
                    Role::Creator => Status::AwaitingCreatorReveal,
                    Role::Challenger => Status::AwaitingChallengerReveal,
                };
            }
        }

        self.notifier.notify(&game);
        Ok(game.clone())
    }

    /// Explicit expiry trigger. Anyone may call it; it fails with
    /// `DeadlineNotReached` until the deadline has actually lapsed.
    /// Stays available while paused.
    pub fn check_expiry(&self, id: u64) -> Result<Game> {
        let slot = self.game_slot(id)?;
        let mut game = slot.lock();

        if game.status.is_terminal() {
            return Err(EngineError::GameNotActive);
        }
        if !game.is_expired_at(Utc::now()) {
            return Err(EngineError::DeadlineNotReached);
        }

        self.finalize_expired(&mut game);
        self.notifier.notify(&game);
        Ok(game.clone())
    }

    // ---- admin ----

    /// Owner-only circuit breaker. While engaged, `deposit`,
    /// `create_game` and `join_game` are rejected; exit paths stay open.
    pub fn set_paused(&self, caller: &Address, paused: bool) -> Result<()> {
        if *caller != self.owner {
            return Err(EngineError::Unauthorized);
        }
        self.paused.store(paused, Ordering::SeqCst);
        if paused {
            tracing::warn!("circuit breaker engaged");
        } else {
            tracing::info!("circuit breaker released");
        }
        Ok(())
    }

    // ---- queries ----

    pub fn game(&self, id: u64) -> Option<Game> {
        let slot = self.games.read().get(&id).cloned()?;
        let game = slot.lock().clone();
        Some(game)
    }

    pub fn balance(&self, account: &Address) -> u64 {
        self.ledger.lock().balance(account)
    }

    pub fn total_escrowed(&self) -> u64 {
        self.ledger.lock().total_escrowed()
    }

    pub fn game_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn minimum_wager(&self) -> u64 {
        self.config.minimum_wager
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Games still waiting for a challenger, ordered by id.
    pub fn open_games(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .values()
            .map(|slot| slot.lock().clone())
            .filter(|game| game.status == Status::Open)
            .collect();
        games.sort_by_key(|game| game.id);
        games
    }

    /// Games `address` takes part in, on either side, ordered by id.
    pub fn games_of(&self, address: &Address) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .values()
            .map(|slot| slot.lock().clone())
            .filter(|game| game.role_of(address).is_some())
            .collect();
        games.sort_by_key(|game| game.id);
        games
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameUpdate> {
        self.notifier.subscribe()
    }

    // ---- internals ----

    fn ensure_not_paused(&self) -> Result<()> {
        if self.is_paused() {
            return Err(EngineError::ContractPaused);
        }
        Ok(())
    }

    fn game_slot(&self, id: u64) -> Result<Arc<Mutex<Game>>> {
        self.games
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::GameNotFound(id))
    }

    /// Pays out a fully revealed game. Caller holds the game lock.
    fn resolve(&self, game: &mut Game, creator_mv: Move, challenger_mv: Move) {
        let mut ledger = self.ledger.lock();
        match winning_role(creator_mv, challenger_mv) {
            Some(role) => {
                // Both parties revealed, so both addresses are present.
                if let Some(winner) = game.address_of(role).cloned() {
                    ledger.release(&winner, game.wager * 2);
                    game.winner = Some(Winner::Player(winner.clone()));
                    tracing::info!(game_id = game.id, %winner, "game finished");
                }
            }
            None => {
                ledger.release(&game.creator, game.wager);
                if let Some(challenger) = game.challenger.clone() {
                    ledger.release(&challenger, game.wager);
                }
                game.winner = Some(Winner::Tie);
                tracing::info!(game_id = game.id, "game finished in a tie");
            }
        }
        game.status = Status::Finished;
    }

    /// Settles a game whose reveal deadline lapsed. A lone revealer
    /// takes the pot; with no reveals both stakes are refunded. Caller
    /// holds the game lock and has already checked the deadline.
    fn finalize_expired(&self, game: &mut Game) {
        let mut ledger = self.ledger.lock();
        let lone_revealer = match (game.creator_move, game.challenger_move) {
            (Some(_), None) => Some(Role::Creator),
            (None, Some(_)) => Some(Role::Challenger),
            // Two reveals resolve immediately, so only the no-reveal
            // case remains.
            _ => None,
        };

        match lone_revealer.and_then(|role| game.address_of(role).cloned()) {
            Some(winner) => {
                ledger.release(&winner, game.wager * 2);
                game.winner = Some(Winner::Player(winner.clone()));
                tracing::info!(game_id = game.id, %winner, "game expired, lone revealer wins");
            }
            None => {
                ledger.release(&game.creator, game.wager);
                if let Some(challenger) = game.challenger.clone() {
                    ledger.release(&challenger, game.wager);
                }
                game.winner = Some(Winner::Tie);
                tracing::info!(game_id = game.id, "game expired with no reveals, stakes refunded");
            }
        }
        game.status = Status::Expired;
    }

    /// Test hook: backdates a game's reveal deadline so expiry paths
    /// can run without waiting out the window.
    #[cfg(test)]
    fn backdate_deadline(&self, id: u64) {
        if let Some(slot) = self.games.read().get(&id) {
            slot.lock().reveal_deadline = Some(Utc::now() - Duration::hours(1));
        }
    }
}
