use crate::tui::TuiMsg;
use sift_search::RequestState;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(80);
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Start the three mailbox feeders: terminal input, spinner ticks and search
/// state changes. All stop when `shutdown` fires or the mailbox closes.
pub fn spawn_feeders(
    tx: mpsc::Sender<TuiMsg>,
    state_rx: watch::Receiver<RequestState>,
    shutdown: CancellationToken,
) {
    let input_tx = tx.clone();
    let input_stop = shutdown.clone();
    tokio::task::spawn_blocking(move || read_input(input_tx, input_stop));
    tokio::spawn(tick(tx.clone(), shutdown.clone()));
    tokio::spawn(watch_state(tx, state_rx, shutdown));
}

/// Blocking crossterm reader; the poll timeout bounds how late it sees `stop`.
fn read_input(tx: mpsc::Sender<TuiMsg>, stop: CancellationToken) {
    while !stop.is_cancelled() {
        let event = match crossterm::event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => crossterm::event::read(),
            Err(e) => Err(e),
        };
        let msg = match event {
            Ok(event) => TuiMsg::Input(event),
            Err(e) => {
                let _ = tx.blocking_send(TuiMsg::InputError(e.to_string()));
                return;
            }
        };
        if tx.blocking_send(msg).is_err() {
            return;
        }
    }
}

async fn tick(tx: mpsc::Sender<TuiMsg>, stop: CancellationToken) {
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = interval.tick() => {
                // a full mailbox already has a redraw pending
                let _ = tx.try_send(TuiMsg::Tick);
            }
        }
    }
}

async fn watch_state(
    tx: mpsc::Sender<TuiMsg>,
    mut state_rx: watch::Receiver<RequestState>,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            changed = state_rx.changed() => {
                if changed.is_err() || tx.send(TuiMsg::StateChanged).await.is_err() {
                    return;
                }
            }
        }
    }
}
