//! In-memory host for driving the shell in tests.

use std::collections::VecDeque;

use super::{InputEvent, IoHost, Output, OutputStyle, PromptConfig, ShellError};

/// Replays queued events, then reports `Eof`. Outputs and the prompt seen
/// by each read are recorded.
#[derive(Debug, Default)]
pub struct TestHost {
    events: VecDeque<InputEvent>,
    outputs: Vec<Output>,
    prompts: Vec<PromptConfig>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut host = Self::new();
        for line in lines {
            host.push(InputEvent::Line(line.into()));
        }
        host
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn texts(&self, style: OutputStyle) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|o| o.style == style)
            .map(|o| o.text.as_str())
            .collect()
    }

    pub fn normal(&self) -> Vec<&str> {
        self.texts(OutputStyle::Normal)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.texts(OutputStyle::Error)
    }

    pub fn last_prompt(&self) -> Option<&PromptConfig> {
        self.prompts.last()
    }
}

impl IoHost for TestHost {
    fn read_event(&mut self, prompt: &PromptConfig) -> Result<InputEvent, ShellError> {
        self.prompts.push(prompt.clone());
        Ok(self.events.pop_front().unwrap_or(InputEvent::Eof))
    }

    fn write_output(&mut self, output: Output) -> Result<(), ShellError> {
        self.outputs.push(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_then_ends() {
        let mut host = TestHost::with_inputs(["first"]);
        host.push(InputEvent::Interrupt);
        let prompt = PromptConfig::default();
        assert_eq!(
            host.read_event(&prompt).unwrap(),
            InputEvent::Line("first".into())
        );
        assert_eq!(host.read_event(&prompt).unwrap(), InputEvent::Interrupt);
        assert_eq!(host.read_event(&prompt).unwrap(), InputEvent::Eof);
        assert_eq!(host.read_event(&prompt).unwrap(), InputEvent::Eof);
        assert_eq!(host.prompts.len(), 4);
    }
}
