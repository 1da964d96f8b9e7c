// Page surface - the markup regions, visual states and dialogs a host exposes
use std::collections::HashMap;

/// Fixed page regions whose content can be swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Mainframe,
    IndexHeader,
    IndexSidebar,
    IndexScripts,
    TemplateDialogContent,
}

impl Region {
    pub fn id(self) -> &'static str {
        match self {
            Region::Mainframe => "container-mainframe",
            Region::IndexHeader => "bzs-index-main-header",
            Region::IndexSidebar => "bzs-index-main-sidebar",
            Region::IndexScripts => "bzs-index-scripts",
            Region::TemplateDialogContent => "dialog-template-container-content",
        }
    }
}

/// Named animation states of the mainframe. Only one is applied at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    FadeOutLeft,
    FadeOutRight,
    FadeInLeft,
    FadeInRight,
}

impl VisualState {
    pub fn class_name(self) -> &'static str {
        match self {
            VisualState::FadeOutLeft => "fadeOutLeft",
            VisualState::FadeOutRight => "fadeOutRight",
            VisualState::FadeInLeft => "fadeInLeft",
            VisualState::FadeInRight => "fadeInRight",
        }
    }

    pub fn fade_out(reverse_direction: bool) -> Self {
        if reverse_direction {
            VisualState::FadeOutRight
        } else {
            VisualState::FadeOutLeft
        }
    }

    pub fn fade_in(reverse_direction: bool) -> Self {
        if reverse_direction {
            VisualState::FadeInLeft
        } else {
            VisualState::FadeInRight
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogId {
    Template,
}

impl DialogId {
    pub fn id(self) -> &'static str {
        match self {
            DialogId::Template => "dialog-template-container",
        }
    }
}

/// Text and attributes shown by the input-string dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputDialogChrome {
    pub title: String,
    pub placeholder: String,
    pub action: String,
    pub correlation_id: String,
}

pub trait Animator {
    /// Apply `state` to the mainframe, removing any other visual state.
    fn apply_visual_state(&mut self, state: VisualState);
}

/// Everything the navigation layer touches on the host page.
pub trait Page: Animator {
    fn replace_region(&mut self, region: Region, html: &str);

    fn region_html(&self, region: Region) -> Option<&str>;

    /// Toggle every element carrying the attribute `tag`.
    fn set_tag_visibility(&mut self, tag: &str, visible: bool);

    fn set_input_dialog_chrome(&mut self, chrome: &InputDialogChrome);

    fn set_dialog_visible(&mut self, dialog: DialogId, visible: bool);
}

/// In-memory page used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryPage {
    regions: HashMap<Region, String>,
    visual_state: Option<VisualState>,
    visual_log: Vec<VisualState>,
    tags: HashMap<String, bool>,
    dialogs: HashMap<DialogId, bool>,
    input_chrome: InputDialogChrome,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual_state(&self) -> Option<VisualState> {
        self.visual_state
    }

    /// Every visual state applied so far, oldest first.
    pub fn visual_log(&self) -> &[VisualState] {
        &self.visual_log
    }

    pub fn tag_visible(&self, tag: &str) -> Option<bool> {
        self.tags.get(tag).copied()
    }

    pub fn dialog_visible(&self, dialog: DialogId) -> bool {
        self.dialogs.get(&dialog).copied().unwrap_or(false)
    }

    pub fn input_chrome(&self) -> &InputDialogChrome {
        &self.input_chrome
    }
}

impl Animator for MemoryPage {
    fn apply_visual_state(&mut self, state: VisualState) {
        self.visual_state = Some(state);
        self.visual_log.push(state);
    }
}

impl Page for MemoryPage {
    fn replace_region(&mut self, region: Region, html: &str) {
        self.regions.insert(region, html.to_string());
    }

    fn region_html(&self, region: Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    fn set_tag_visibility(&mut self, tag: &str, visible: bool) {
        self.tags.insert(tag.to_string(), visible);
    }

    fn set_input_dialog_chrome(&mut self, chrome: &InputDialogChrome) {
        self.input_chrome = chrome.clone();
    }

    fn set_dialog_visible(&mut self, dialog: DialogId, visible: bool) {
        self.dialogs.insert(dialog, visible);
    }
}
