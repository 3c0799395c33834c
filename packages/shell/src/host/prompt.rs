use std::borrow::Cow;

use nu_ansi_term::Color;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode,
};

use crate::io::PromptConfig;

/// `[2 orgs] /acme/hosts % `
pub(crate) struct ShellPrompt<'a> {
    pub config: &'a PromptConfig,
}

impl Prompt for ShellPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let orgs = match self.config.org_count {
            0 => Color::Yellow.paint("[no orgs]"),
            1 => Color::Blue.paint("[1 org]"),
            n => Color::Blue.paint(format!("[{n} orgs]")),
        };
        Cow::Owned(format!(
            "{orgs} {}",
            Color::Green.bold().paint(&self.config.current_path)
        ))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        let marker = match edit_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => ":",
            _ => "%",
        };
        Cow::Owned(format!(" {marker} "))
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let status = match search.status {
            PromptHistorySearchStatus::Passing => "search",
            PromptHistorySearchStatus::Failing => "no match",
        };
        Cow::Owned(format!("({status}: {}) ", search.term))
    }
}
