//! Choosing between vi and emacs key bindings.

use std::path::PathBuf;

use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    EditCommand, EditMode, Emacs, KeyCode, KeyModifiers, ReedlineEvent, Vi,
};

use super::COMPLETION_MENU;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditModePreference {
    /// Vi if `EDITOR`, `VISUAL` or an inputrc asks for it, emacs otherwise.
    #[default]
    Detect,
    Vi,
    Emacs,
}

impl EditModePreference {
    pub fn is_vi(self) -> bool {
        match self {
            EditModePreference::Vi => true,
            EditModePreference::Emacs => false,
            EditModePreference::Detect => detect_vi(),
        }
    }

    pub(crate) fn build(self) -> Box<dyn EditMode> {
        if self.is_vi() {
            let mut insert = default_vi_insert_keybindings();
            insert.add_binding(KeyModifiers::NONE, KeyCode::Tab, complete());
            Box::new(Vi::new(insert, default_vi_normal_keybindings()))
        } else {
            let mut keys = default_emacs_keybindings();
            keys.add_binding(KeyModifiers::NONE, KeyCode::Tab, complete());
            // Ctrl+D clears the line instead of leaving; `exit` leaves.
            keys.add_binding(
                KeyModifiers::CONTROL,
                KeyCode::Char('d'),
                ReedlineEvent::Edit(vec![EditCommand::Clear]),
            );
            Box::new(Emacs::new(keys))
        }
    }
}

fn complete() -> ReedlineEvent {
    ReedlineEvent::UntilFound(vec![
        ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
        ReedlineEvent::MenuNext,
    ])
}

fn detect_vi() -> bool {
    let editor_is_vi = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .any(|editor| names_vi(&editor));
    editor_is_vi || inputrc_files().any(|content| inputrc_wants_vi(&content))
}

/// Whether an editor command is some flavor of vi.
fn names_vi(editor: &str) -> bool {
    let program = editor
        .split_whitespace()
        .next()
        .unwrap_or("")
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_lowercase();
    matches!(program.as_str(), "vi" | "vim" | "nvim" | "gvim" | "mvim")
}

fn inputrc_files() -> impl Iterator<Item = String> {
    [
        std::env::var_os("INPUTRC").map(PathBuf::from),
        dirs::home_dir().map(|home| home.join(".inputrc")),
        Some(PathBuf::from("/etc/inputrc")),
    ]
    .into_iter()
    .flatten()
    .filter_map(|path| std::fs::read_to_string(path).ok())
}

fn inputrc_wants_vi(content: &str) -> bool {
    content
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .any(|words| words == ["set", "editing-mode", "vi"])
}
