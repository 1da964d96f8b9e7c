use crate::error::FetchError;
use crate::fetch::FormField;
use crate::fragment::Fragment;
use crate::page::Region;
use crate::target::NavigationTarget;

#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    Navigate {
        target: NavigationTarget,
        reverse_direction: bool,
        record_history: bool,
    },
    NavigateSeamless(NavigationTarget),
    Refresh,
    Rollback,
    Rollfront,
    ReloadIndex,
    TriggerActivated(NavigationTarget),
    Swipe(SwipeDirection),

    // Viewport
    Resized(u32),

    // Dialogs
    SubmitInputDialog(Vec<FormField>),
    LoadTemplateDialog(NavigationTarget),
    UnloadTemplateDialog,
    LoadLoadingDialog(String),
    UnloadLoadingDialog,

    // Deferred completions
    FadeOutElapsed { seq: u64 },
    SettleElapsed { seq: u64 },
    WatchdogElapsed { seq: u64 },
    Fetched {
        purpose: FetchPurpose,
        result: Result<Fragment, FetchError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Where a fetched fragment is headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPurpose {
    Mainframe { seq: u64 },
    Region(Region),
    TemplateDialog(NavigationTarget),
    Submission { correlation_id: String },
}
