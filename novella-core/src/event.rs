/// Notifications the player queues for the presentation layer. The
/// presentation state itself is read from the stage.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    ShowText { speaker: String, text: String },
    ShowChoices { options: Vec<String> },
    /// `name` is `None` when the background was cleared with `_`.
    BackgroundChanged { name: Option<String>, locator: Option<String> },
    /// Asset locators the upcoming nodes will need.
    Preload {
        images: Vec<String>,
        audios: Vec<String>,
    },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ChoiceMade { index: usize },
    Continue,
    Exit,
    SaveRequest { slot: u32 },
    LoadRequest { slot: u32 },
}
