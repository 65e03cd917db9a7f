use tilecore::LevelId;
use tracing::info;

/// Told about every level change; the audio mixer hangs off this seam.
pub(crate) trait LevelListener {
    fn on_level_change(&mut self, level: &LevelId) {
        info!(level = %level, "level_track_changed");
    }
}

#[derive(Debug, Default)]
pub(crate) struct LoggingLevelListener;

impl LevelListener for LoggingLevelListener {}
