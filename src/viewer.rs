//! The viewer owns the scene currently on screen. Loading a new source tears
//! the previous scene down before the replacement is drawn.

use std::path::Path;

use crate::config::Settings;
use crate::error::Result;
use crate::mxl;
use crate::pianoroll;
use crate::renderer;
use crate::scene::Scene;
use crate::sequence::NoteSequence;

#[derive(Debug, Default)]
pub struct Viewer {
    settings: Settings,
    scene: Option<Scene>,
}

impl Viewer {
    pub fn new(settings: Settings) -> Self {
        Self { settings, scene: None }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Load a MusicXML or MXL source and show it as engraved notation. On
    /// error the current scene stays untouched.
    pub fn show_score_bytes(&mut self, name: &str, data: &[u8]) -> Result<&mut Scene> {
        let score = mxl::load_source(name, data)?;
        let scene = renderer::render_score(&score, &self.settings.render);
        log::info!(
            "showing score '{}' ({} parts, {} note groups)",
            name,
            score.parts.len(),
            scene.note_groups().len()
        );
        Ok(self.replace(scene))
    }

    pub fn show_score_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Scene> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        self.show_score_bytes(&path.to_string_lossy(), &data)
    }

    /// Show a note sequence as a piano roll.
    pub fn show_sequence(&mut self, seq: &NoteSequence) -> Result<&mut Scene> {
        let scene = pianoroll::render_sequence(seq, &self.settings.piano_roll)?;
        log::info!("showing piano roll ({} notes, {:.2}s)", seq.notes.len(), seq.total_time);
        Ok(self.replace(scene))
    }

    pub fn show_midi_bytes(&mut self, data: &[u8]) -> Result<&mut Scene> {
        let seq = NoteSequence::from_midi(data)?;
        self.show_sequence(&seq)
    }

    /// Tear down and drop the current scene.
    pub fn clear(&mut self) {
        if let Some(mut old) = self.scene.take() {
            old.teardown();
        }
    }

    fn replace(&mut self, scene: Scene) -> &mut Scene {
        self.clear();
        self.scene.insert(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceNote;

    #[test]
    fn loading_replaces_the_scene() {
        let mut viewer = Viewer::default();
        let seq = NoteSequence {
            notes: vec![SequenceNote {
                pitch: 60,
                start_time: 0.0,
                end_time: 1.0,
                velocity: None,
                instrument: 0,
                program: 0,
                is_drum: false,
            }],
            total_time: 1.0,
            ..Default::default()
        };
        viewer.show_sequence(&seq).unwrap().init_scope("fx").unwrap();
        assert!(viewer.scene().unwrap().filter_chain("fx").is_some());

        viewer.show_sequence(&seq).unwrap();
        let scene = viewer.scene().unwrap();
        assert!(scene.filter_chain("fx").is_none());
        assert_eq!(scene.note_groups().len(), 1);
    }

    #[test]
    fn failed_load_keeps_current_scene() {
        let mut viewer = Viewer::default();
        viewer.show_sequence(&NoteSequence::default()).unwrap();
        assert!(viewer.show_score_bytes("broken.musicxml", b"<nope").is_err());
        assert!(viewer.scene().is_some());
    }
}
