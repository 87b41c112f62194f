// Application state for HTTP handlers
use crate::application::board_service::BoardService;

pub struct AppState {
    pub board_service: BoardService,
}
