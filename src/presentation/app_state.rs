// Application state for HTTP handlers
use crate::application::publication::SnapshotReader;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotReader,
}
