//! Game session actor and authoritative tick loop
//!
//! One task owns the `World`; connection handlers talk to it through a
//! command channel and receive snapshots over a broadcast channel. All
//! world mutation happens between two await points of this task, which
//! keeps the collection scans sequentially consistent without locks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{info, warn};

use crate::config::sim::{tick_delta, TICK_RATE};
use crate::util::time::Timer;
use crate::ws::protocol::{PlayerIntent, ServerMsg};

use super::snapshot::world_snapshot;
use super::world::{AdmissionError, PlayerId, World};

/// Commands from connection handlers to the session task
#[derive(Debug)]
pub enum SessionCommand {
    /// Admit a new connection; the result is delivered on the reply channel
    Join {
        reply: oneshot::Sender<Result<PlayerId, AdmissionError>>,
    },
    /// Latest intent for a player, replacing the previous one wholesale
    Input {
        player_id: PlayerId,
        intent: PlayerIntent,
    },
    /// Unregister a player (disconnect or explicit close)
    Leave { player_id: PlayerId },
}

/// Handle to the running session
#[derive(Clone)]
pub struct SessionHandle {
    pub command_tx: mpsc::Sender<SessionCommand>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    player_count: Arc<AtomicUsize>,
}

impl SessionHandle {
    /// Subscribe to the per-tick snapshot broadcast
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.snapshot_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }
}

/// The authoritative game session
pub struct GameSession {
    world: World,
    command_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    player_count: Arc<AtomicUsize>,
}

impl GameSession {
    pub fn new() -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let player_count = Arc::new(AtomicUsize::new(0));

        let handle = SessionHandle {
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
            player_count: player_count.clone(),
        };

        let session = Self {
            world: World::new(),
            command_rx,
            snapshot_tx,
            player_count,
        };

        (session, handle)
    }

    /// Run the fixed-rate tick loop. Never returns short of process
    /// shutdown.
    pub async fn run(mut self) {
        let dt = tick_delta();
        info!(tick_rate = TICK_RATE, "Simulation loop started");

        loop {
            let timer = Timer::new();

            self.drain_commands();
            self.world.step(dt);

            // Broadcast only while someone is listening
            if self.snapshot_tx.receiver_count() > 0 {
                let _ = self.snapshot_tx.send(world_snapshot(&self.world));
            }

            // Self-pacing: a slow tick eats into the sleep, it is never
            // compensated by catch-up ticks.
            let remaining = (dt - timer.elapsed_secs()).max(0.0);
            tokio::time::sleep(Duration::from_secs_f64(remaining)).await;
        }
    }

    /// Apply every command received since the previous tick, in receipt
    /// order. Admission and removal both land here, so a freed slot is
    /// visible to the very next admission check.
    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                SessionCommand::Join { reply } => self.handle_join(reply),
                SessionCommand::Input { player_id, intent } => {
                    self.world.set_intent(player_id, intent);
                }
                SessionCommand::Leave { player_id } => {
                    self.world.remove(player_id);
                    self.sync_player_count();
                    info!(
                        player_id,
                        player_count = self.world.player_count(),
                        "Player disconnected"
                    );
                }
            }
        }
    }

    fn handle_join(&mut self, reply: oneshot::Sender<Result<PlayerId, AdmissionError>>) {
        match self.world.admit() {
            Ok(player_id) => {
                if reply.send(Ok(player_id)).is_err() {
                    // Handler went away before the reply landed
                    self.world.remove(player_id);
                } else {
                    info!(
                        player_id,
                        player_count = self.world.player_count(),
                        "Player connected"
                    );
                }
                self.sync_player_count();
            }
            Err(err) => {
                warn!(player_count = self.world.player_count(), "Admission rejected: {err}");
                let _ = reply.send(Err(err));
            }
        }
    }

    fn sync_player_count(&self) {
        self.player_count
            .store(self.world.player_count(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(session: &mut GameSession, handle: &SessionHandle) -> Result<PlayerId, AdmissionError> {
        let (reply_tx, mut reply_rx) = oneshot::channel();
        handle
            .command_tx
            .try_send(SessionCommand::Join { reply: reply_tx })
            .unwrap();
        session.drain_commands();
        reply_rx.try_recv().unwrap()
    }

    #[test]
    fn join_and_leave_commands_update_the_registry() {
        let (mut session, handle) = GameSession::new();

        let id = join(&mut session, &handle).unwrap();
        assert_eq!(handle.player_count(), 1);

        handle
            .command_tx
            .try_send(SessionCommand::Leave { player_id: id })
            .unwrap();
        session.drain_commands();
        assert_eq!(handle.player_count(), 0);
    }

    #[test]
    fn fifth_join_is_rejected_with_game_full() {
        let (mut session, handle) = GameSession::new();
        for _ in 0..4 {
            join(&mut session, &handle).unwrap();
        }
        let err = join(&mut session, &handle).unwrap_err();
        assert_eq!(err.to_string(), "Game full");
        assert_eq!(handle.player_count(), 4);
    }

    #[test]
    fn leave_processed_before_a_later_join_frees_the_slot() {
        let (mut session, handle) = GameSession::new();
        let ids: Vec<_> = (0..4).map(|_| join(&mut session, &handle).unwrap()).collect();

        // Queue a leave and a join together; receipt order decides
        let (reply_tx, mut reply_rx) = oneshot::channel();
        handle
            .command_tx
            .try_send(SessionCommand::Leave { player_id: ids[0] })
            .unwrap();
        handle
            .command_tx
            .try_send(SessionCommand::Join { reply: reply_tx })
            .unwrap();
        session.drain_commands();

        assert!(reply_rx.try_recv().unwrap().is_ok());
        assert_eq!(handle.player_count(), 4);
    }

    #[test]
    fn abandoned_join_reply_rolls_back_the_admission() {
        let (mut session, handle) = GameSession::new();
        let (reply_tx, reply_rx) = oneshot::channel();
        drop(reply_rx);
        handle
            .command_tx
            .try_send(SessionCommand::Join { reply: reply_tx })
            .unwrap();
        session.drain_commands();
        assert_eq!(handle.player_count(), 0);
    }

    #[test]
    fn input_command_lands_in_the_intent_table() {
        let (mut session, handle) = GameSession::new();
        let id = join(&mut session, &handle).unwrap();

        handle
            .command_tx
            .try_send(SessionCommand::Input {
                player_id: id,
                intent: PlayerIntent {
                    thrust: true,
                    ..PlayerIntent::default()
                },
            })
            .unwrap();
        session.drain_commands();

        assert!(session.world.intents[&id].thrust);
    }

    #[test]
    fn input_for_a_departed_player_is_dropped_silently() {
        let (mut session, handle) = GameSession::new();
        let id = join(&mut session, &handle).unwrap();
        handle
            .command_tx
            .try_send(SessionCommand::Leave { player_id: id })
            .unwrap();
        handle
            .command_tx
            .try_send(SessionCommand::Input {
                player_id: id,
                intent: PlayerIntent {
                    shoot: true,
                    ..PlayerIntent::default()
                },
            })
            .unwrap();
        session.drain_commands();
        assert!(session.world.intents.is_empty());
    }
}
