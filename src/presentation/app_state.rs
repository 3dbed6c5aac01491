// Application state for HTTP handlers
use crate::application::poller::PollerHandle;
use crate::infrastructure::status_board::StatusBoard;

#[derive(Clone)]
pub struct AppState {
    pub board: StatusBoard,
    pub poller: PollerHandle,
}
