use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::libquiz::question::Question;

/// Durable store for one fetched question batch. Writes are best-effort: a
/// failed save or clear is logged, never surfaced to the player.
pub trait QuestionCache {
    fn load(&self) -> Option<Vec<Question>>;
    fn save(&self, questions: &[Question]);
    fn clear(&self);
}

/// File-backed cache, one JSON file holding the serialized question batch.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl QuestionCache for FileCache {
    fn load(&self) -> Option<Vec<Question>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(_) => {
                debug!("[Cache] No cached questions at {:?}.", self.path);
                return None;
            }
        };
        match serde_json::from_str::<Vec<Question>>(&json) {
            Ok(questions) if !questions.is_empty() => {
                info!(
                    "[Cache] Loaded {} questions from {:?}.",
                    questions.len(),
                    self.path
                );
                Some(questions)
            }
            Ok(_) => {
                warn!("[Cache] Cached batch at {:?} is empty. Discarding.", self.path);
                self.clear();
                None
            }
            Err(err) => {
                warn!("[Cache] Cached questions are invalid ({}). Discarding.", err);
                self.clear();
                None
            }
        }
    }

    fn save(&self, questions: &[Question]) {
        let json = match serde_json::to_string(questions) {
            Ok(json) => json,
            Err(err) => {
                warn!("[Cache] Cannot serialize questions: {}.", err);
                return;
            }
        };
        match fs::write(&self.path, json) {
            Ok(_) => debug!(
                "[Cache] Saved {} questions to {:?}.",
                questions.len(),
                self.path
            ),
            Err(err) => warn!("[Cache] Cannot write {:?}: {}.", self.path, err),
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(_) => debug!("[Cache] Cleared {:?}.", self.path),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!("[Cache] Cannot clear {:?}: {}.", self.path, err),
        }
    }
}
