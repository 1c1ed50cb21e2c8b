mod dialogue;
mod json;
mod level_manifest;
mod map_format;
mod source;

pub use dialogue::{
    load_story, parse_story, ChoiceView, DialogueChoice, DialogueError, DialogueLine,
    DialogueRunner, DialogueView, StoryArc, StoryScene, StoryScript,
};
pub use json::{parse_json_with_path, JsonPathError};
pub use level_manifest::{load_level_manifest, parse_level_manifest, ManifestError};
pub use map_format::{parse_map, MapError};
pub use source::{DirMapSource, MapSource, MapSourceError, MemoryMapSource};
