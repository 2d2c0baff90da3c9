//! Access to the piece placement the setup editor persisted. The session only checks that a grid of
//! the right shape is present, the value and king rules are exposed for the editor itself.

use crate::error::SessionError;
use duck_protocol::{BOARD_DIM, BOARD_SETUP_KEY, PieceKind, SETUP_ROWS, SetupGrid};
use std::collections::HashMap;
use std::path::PathBuf;

/// The highest total piece value a setup may have.
pub const MAX_SETUP_VALUE: u32 = 4800;

/// Key value storage holding serialized local state.
pub trait SetupStorage {
    /// The stored raw value for the key, if any.
    fn load(&self, key: &str) -> Option<String>;
}

/// Reads `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileSetupStorage {
    dir: PathBuf,
}

impl FileSetupStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSetupStorage { dir: dir.into() }
    }
}

impl SetupStorage for FileSetupStorage {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.dir.join(format!("{key}.json"));
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::debug!(?err, path = %path.display(), "No stored value.");
                None
            }
        }
    }
}

/// In memory storage.
#[derive(Clone, Debug, Default)]
pub struct MemorySetupStorage {
    values: HashMap<String, String>,
}

impl MemorySetupStorage {
    pub fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    /// Storage holding the indicated grid under the setup key.
    pub fn with_setup(setup: &BoardSetup) -> Self {
        let mut storage = MemorySetupStorage::default();
        if let Ok(raw) = serde_json::to_string(setup.grid()) {
            storage.insert(BOARD_SETUP_KEY, raw);
        }
        storage
    }
}

impl SetupStorage for MemorySetupStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A structurally valid placement grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSetup {
    grid: SetupGrid,
}

impl BoardSetup {
    /// Checks the shape of the grid.
    pub fn new(grid: SetupGrid) -> Result<Self, SessionError> {
        if grid.len() != SETUP_ROWS || grid.iter().any(|row| row.len() != BOARD_DIM) {
            return Err(SessionError::Configuration(format!(
                "board setup has to be {SETUP_ROWS} rows of {BOARD_DIM} tiles"
            )));
        }
        Ok(BoardSetup { grid })
    }

    /// Reads and checks the setup from the storage.
    pub fn from_storage(storage: &dyn SetupStorage) -> Result<Self, SessionError> {
        let raw = storage.load(BOARD_SETUP_KEY).ok_or_else(|| {
            SessionError::Configuration("no board setup stored, create one first".to_string())
        })?;
        let grid: SetupGrid = serde_json::from_str(&raw)
            .map_err(|e| SessionError::Configuration(format!("stored board setup is broken: {e}")))?;
        BoardSetup::new(grid)
    }

    pub fn grid(&self) -> &SetupGrid {
        &self.grid
    }

    pub fn into_grid(self) -> SetupGrid {
        self.grid
    }

    /// The summed material value of all placed pieces.
    pub fn total_value(&self) -> u32 {
        self.pieces().map(piece_value).sum()
    }

    pub fn king_count(&self) -> usize {
        self.pieces()
            .filter(|kind| matches!(kind, PieceKind::King { .. }))
            .count()
    }

    /// The editor rule: exactly one king and a total value of at most [`MAX_SETUP_VALUE`].
    pub fn is_valid(&self) -> bool {
        self.king_count() == 1 && self.total_value() <= MAX_SETUP_VALUE
    }

    fn pieces(&self) -> impl Iterator<Item = &PieceKind> {
        self.grid.iter().flatten().flatten()
    }
}

/// Material value of a piece kind.
pub fn piece_value(kind: &PieceKind) -> u32 {
    match kind {
        PieceKind::King { .. } => 400,
        PieceKind::Queen => 900,
        PieceKind::Castle => 500,
        PieceKind::Bishop | PieceKind::Knight => 300,
        PieceKind::Pawn { .. } => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_row() -> Vec<Option<PieceKind>> {
        vec![
            Some(PieceKind::Castle),
            Some(PieceKind::Knight),
            Some(PieceKind::Bishop),
            Some(PieceKind::Queen),
            Some(PieceKind::King { has_castled: false }),
            Some(PieceKind::Bishop),
            Some(PieceKind::Knight),
            Some(PieceKind::Castle),
        ]
    }

    fn pawn_row() -> Vec<Option<PieceKind>> {
        vec![Some(PieceKind::Pawn { has_moved: false }); BOARD_DIM]
    }

    #[test]
    fn classic_setup_is_valid() {
        let setup = BoardSetup::new(vec![pawn_row(), classic_row()]).unwrap();
        assert_eq!(setup.total_value(), 4300);
        assert_eq!(setup.king_count(), 1);
        assert!(setup.is_valid());
    }

    #[test]
    fn too_expensive_setup_is_invalid() {
        let mut expensive = classic_row();
        expensive[1] = Some(PieceKind::Queen);
        let setup = BoardSetup::new(vec![pawn_row(), expensive]).unwrap();
        assert_eq!(setup.total_value(), 4900);
        assert!(!setup.is_valid());
    }

    #[test]
    fn wrong_shape_is_a_configuration_error() {
        let err = BoardSetup::new(vec![pawn_row()]).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
        assert!(!err.is_retryable());
        assert!(BoardSetup::new(vec![pawn_row(), vec![None; 3]]).is_err());
    }

    #[test]
    fn storage_round_trip_and_failures() {
        let setup = BoardSetup::new(vec![vec![None; BOARD_DIM], classic_row()]).unwrap();
        let storage = MemorySetupStorage::with_setup(&setup);
        assert_eq!(BoardSetup::from_storage(&storage).unwrap(), setup);

        let empty = MemorySetupStorage::default();
        assert!(matches!(
            BoardSetup::from_storage(&empty),
            Err(SessionError::Configuration(_))
        ));

        let mut broken = MemorySetupStorage::default();
        broken.insert(BOARD_SETUP_KEY, "{not json".to_string());
        assert!(BoardSetup::from_storage(&broken).is_err());
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let storage = FileSetupStorage::new("/definitely/not/existing/dir");
        assert_eq!(storage.load(BOARD_SETUP_KEY), None);
    }
}
