use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::json::{parse_json_with_path, JsonPathError};
use crate::world::Inventory;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("failed to read story script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid story script json {0}")]
    Parse(#[from] JsonPathError),
    #[error("story script has no arcs")]
    NoArcs,
    #[error("story arc '{arc}' has no scenes")]
    EmptyArc { arc: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryScript {
    pub arcs: Vec<StoryArc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryArc {
    pub id: String,
    pub scenes: Vec<StoryScene>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryScene {
    pub id: String,
    #[serde(default)]
    pub lines: Vec<DialogueLine>,
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub portrait: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DialogueChoice {
    pub text: String,
    pub next_scene: String,
    #[serde(default)]
    pub required_item: Option<String>,
}

impl DialogueChoice {
    pub fn is_available(&self, inventory: &Inventory) -> bool {
        self.required_item
            .as_deref()
            .map_or(true, |item| inventory.contains(item))
    }
}

pub fn parse_story(text: &str) -> Result<StoryScript, DialogueError> {
    let script: StoryScript = parse_json_with_path(text)?;
    let Some(first) = script.arcs.first() else {
        return Err(DialogueError::NoArcs);
    };
    if first.scenes.is_empty() {
        return Err(DialogueError::EmptyArc {
            arc: first.id.clone(),
        });
    }
    Ok(script)
}

pub fn load_story(path: &Path) -> Result<StoryScript, DialogueError> {
    let text = fs::read_to_string(path).map_err(|source| DialogueError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_story(&text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Line(usize),
    Choosing { selected: usize },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceView<'a> {
    pub text: &'a str,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueView<'a> {
    Line {
        speaker: &'a str,
        text: &'a str,
        portrait: Option<&'a str>,
    },
    Choices {
        options: Vec<ChoiceView<'a>>,
        selected: usize,
    },
    Finished,
}

/// Walks a story script: lines in order, then the scene's choices.
#[derive(Debug, Clone)]
pub struct DialogueRunner {
    script: StoryScript,
    arc: usize,
    scene: usize,
    phase: Phase,
}

impl DialogueRunner {
    pub fn new(script: StoryScript) -> Self {
        let mut runner = Self {
            script,
            arc: 0,
            scene: 0,
            phase: Phase::Finished,
        };
        runner.restart();
        runner
    }

    pub fn restart(&mut self) {
        self.enter_scene(0, 0, &Inventory::new());
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn current_arc_id(&self) -> Option<&str> {
        self.script.arcs.get(self.arc).map(|arc| arc.id.as_str())
    }

    pub fn current_scene_id(&self) -> Option<&str> {
        self.current_scene().map(|scene| scene.id.as_str())
    }

    fn current_scene(&self) -> Option<&StoryScene> {
        self.script.arcs.get(self.arc)?.scenes.get(self.scene)
    }

    pub fn view(&self, inventory: &Inventory) -> DialogueView<'_> {
        let Some(scene) = self.current_scene() else {
            return DialogueView::Finished;
        };
        match self.phase {
            Phase::Line(index) => match scene.lines.get(index) {
                Some(line) => DialogueView::Line {
                    speaker: &line.speaker,
                    text: &line.text,
                    portrait: line.portrait.as_deref(),
                },
                None => DialogueView::Finished,
            },
            Phase::Choosing { selected } => DialogueView::Choices {
                options: scene
                    .choices
                    .iter()
                    .map(|choice| ChoiceView {
                        text: &choice.text,
                        available: choice.is_available(inventory),
                    })
                    .collect(),
                selected,
            },
            Phase::Finished => DialogueView::Finished,
        }
    }

    /// Next line; past the last line, the choices; with no choices, the end.
    /// While choosing, confirms the selected choice.
    pub fn advance(&mut self, inventory: &Inventory) {
        match self.phase {
            Phase::Line(index) => self.show_line_or_choices(index + 1, inventory),
            Phase::Choosing { selected } => {
                self.choose(selected, inventory);
            }
            Phase::Finished => {}
        }
    }

    pub fn select_next(&mut self, inventory: &Inventory) {
        self.move_selection(1, inventory);
    }

    pub fn select_previous(&mut self, inventory: &Inventory) {
        self.move_selection(-1, inventory);
    }

    /// Unavailable or out-of-range choices are refused.
    pub fn choose(&mut self, index: usize, inventory: &Inventory) -> bool {
        if !matches!(self.phase, Phase::Choosing { .. }) {
            return false;
        }
        let Some(choice) = self
            .current_scene()
            .and_then(|scene| scene.choices.get(index))
        else {
            return false;
        };
        if !choice.is_available(inventory) {
            debug!(choice = index, "dialogue_choice_unavailable");
            return false;
        }
        let target = choice.next_scene.clone();
        match self.find_scene(&target) {
            Some((arc, scene)) => self.enter_scene(arc, scene, inventory),
            None => {
                info!(scene = %target, "dialogue_target_missing");
                self.phase = Phase::Finished;
            }
        }
        true
    }

    /// Current arc first, then every arc in order.
    fn find_scene(&self, id: &str) -> Option<(usize, usize)> {
        let in_arc = |arc_index: usize| {
            self.script.arcs.get(arc_index).and_then(|arc| {
                arc.scenes
                    .iter()
                    .position(|scene| scene.id == id)
                    .map(|scene_index| (arc_index, scene_index))
            })
        };
        in_arc(self.arc).or_else(|| (0..self.script.arcs.len()).find_map(in_arc))
    }

    fn enter_scene(&mut self, arc: usize, scene: usize, inventory: &Inventory) {
        self.arc = arc;
        self.scene = scene;
        self.show_line_or_choices(0, inventory);
    }

    fn show_line_or_choices(&mut self, line: usize, inventory: &Inventory) {
        let Some(scene) = self.current_scene() else {
            self.phase = Phase::Finished;
            return;
        };
        self.phase = if line < scene.lines.len() {
            Phase::Line(line)
        } else if scene.choices.is_empty() {
            Phase::Finished
        } else {
            match scene
                .choices
                .iter()
                .position(|choice| choice.is_available(inventory))
            {
                Some(selected) => Phase::Choosing { selected },
                None => {
                    debug!(scene = %scene.id, "dialogue_no_available_choice");
                    Phase::Finished
                }
            }
        };
    }

    fn move_selection(&mut self, delta: isize, inventory: &Inventory) {
        let Phase::Choosing { selected } = self.phase else {
            return;
        };
        let Some(scene) = self.current_scene() else {
            return;
        };
        let count = scene.choices.len() as isize;
        let mut candidate = selected as isize;
        for _ in 0..count {
            candidate = (candidate + delta).rem_euclid(count);
            if scene.choices[candidate as usize].is_available(inventory) {
                self.phase = Phase::Choosing {
                    selected: candidate as usize,
                };
                return;
            }
        }
    }
}
