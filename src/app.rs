use crate::binder::TriggerBinder;
use crate::config::Config;
use crate::dialog::{DialogController, SubmitHandler};
use crate::error::{FetchError, TargetError};
use crate::fetch::FetchRequest;
use crate::fragment::Fragment;
use crate::message::{FetchPurpose, Message, SwipeDirection};
use crate::page::{Page, Region};
use crate::target::NavigationTarget;
use crate::task::Task;
use crate::transition::{Completion, TransitionController};
use crate::viewport::Breakpoints;

// Index chrome regions reloaded by `Message::ReloadIndex`.
const INDEX_REGIONS: [Region; 3] = [Region::IndexHeader, Region::IndexSidebar, Region::IndexScripts];

/// The navigation layer of one page session.
pub struct Shell<P: Page> {
    page: P,
    transitions: TransitionController,
    dialogs: DialogController,
    binder: TriggerBinder,
    breakpoints: Breakpoints,
    viewport_width: Option<u32>,
}

impl<P: Page> Shell<P> {
    pub fn new(config: &Config, page: P) -> Result<Self, TargetError> {
        let initial = NavigationTarget::parse(config.transition.initial_target.as_str())?;
        Ok(Self {
            page,
            transitions: TransitionController::new(initial, config.transition.clone()),
            dialogs: DialogController::new(),
            binder: TriggerBinder::new(),
            breakpoints: config.viewport,
            viewport_width: None,
        })
    }

    /// Bind whatever the page already shows and load the initial target.
    pub fn start(&mut self) -> Task {
        self.binder.rebind(&self.page);
        self.transitions.navigate_refresh(&mut self.page)
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn transitions(&self) -> &TransitionController {
        &self.transitions
    }

    pub fn dialogs(&self) -> &DialogController {
        &self.dialogs
    }

    pub fn binder(&self) -> &TriggerBinder {
        &self.binder
    }

    pub fn load_input_dialog(
        &mut self,
        title: &str,
        placeholder: &str,
        submit_action: &str,
        correlation_id: &str,
        on_submit: SubmitHandler,
    ) {
        self.dialogs
            .load_input_dialog(&mut self.page, title, placeholder, submit_action, correlation_id, on_submit);
    }

    pub fn update(&mut self, message: Message) -> Task {
        match message {
            Message::Navigate {
                target,
                reverse_direction,
                record_history,
            } => self
                .transitions
                .navigate(&mut self.page, target, reverse_direction, record_history),
            Message::NavigateSeamless(target) => self.transitions.navigate_seamless(&mut self.page, target),
            Message::Refresh => self.transitions.navigate_refresh(&mut self.page),
            Message::Rollback => self.rollback(),
            Message::Rollfront => self.rollfront(),
            Message::ReloadIndex => self.reload_index(),
            Message::TriggerActivated(target) => self.trigger_activated(target),
            Message::Swipe(SwipeDirection::Right) => self.rollback(),
            Message::Swipe(SwipeDirection::Left) => self.rollfront(),
            Message::Resized(width) => self.resized(width),
            Message::SubmitInputDialog(fields) => self.dialogs.submit_input_dialog(&fields),
            Message::LoadTemplateDialog(target) => self.dialogs.load_template_dialog(target),
            Message::UnloadTemplateDialog => {
                self.dialogs.unload_template_dialog(&mut self.page);
                Task::none()
            }
            Message::LoadLoadingDialog(title) => {
                self.dialogs.load_loading_dialog(&mut self.page, &title);
                Task::none()
            }
            Message::UnloadLoadingDialog => {
                self.dialogs.unload_loading_dialog(&mut self.page);
                Task::none()
            }
            Message::FadeOutElapsed { seq } => self.transitions.fade_out_elapsed(seq),
            Message::SettleElapsed { seq } => {
                self.transitions.settle_elapsed(seq);
                Task::none()
            }
            Message::WatchdogElapsed { seq } => {
                let completion = self.transitions.watchdog_elapsed(&mut self.page, seq);
                self.after_completion(completion)
            }
            Message::Fetched { purpose, result } => self.fetched(purpose, result),
        }
    }

    fn rollback(&mut self) -> Task {
        self.transitions.rollback(&mut self.page).unwrap_or_default()
    }

    fn rollfront(&mut self) -> Task {
        self.transitions.rollfront(&mut self.page).unwrap_or_default()
    }

    fn trigger_activated(&mut self, target: NavigationTarget) -> Task {
        if !self.binder.is_bound(&target) {
            tracing::debug!(nav_target = %target, "activation of unbound trigger ignored");
            return Task::none();
        }
        self.transitions.navigate(&mut self.page, target, false, true)
    }

    fn resized(&mut self, width: u32) -> Task {
        self.viewport_width = Some(width);
        self.breakpoints.apply(&mut self.page, width);
        Task::none()
    }

    fn reload_index(&mut self) -> Task {
        let mut tasks = Vec::with_capacity(INDEX_REGIONS.len() + 1);
        for region in INDEX_REGIONS {
            match NavigationTarget::parse(format!("/ #{}", region.id())) {
                Ok(target) => tasks.push(Task::fetch(FetchRequest::get(&target), FetchPurpose::Region(region))),
                Err(error) => tracing::warn!(%error, "bad index region target"),
            }
        }
        tasks.push(self.transitions.navigate_refresh(&mut self.page));
        Task::batch(tasks)
    }

    fn fetched(&mut self, purpose: FetchPurpose, result: Result<Fragment, FetchError>) -> Task {
        match purpose {
            FetchPurpose::Mainframe { seq } => {
                let completion = self.transitions.fetched(&mut self.page, seq, result);
                self.after_completion(completion)
            }
            FetchPurpose::Region(region) => {
                match result {
                    Ok(fragment) => {
                        self.page.replace_region(region, fragment.html());
                        if region == Region::IndexSidebar {
                            self.binder.rebind(&self.page);
                        }
                    }
                    Err(error) => tracing::warn!(region = region.id(), %error, "region load failed"),
                }
                Task::none()
            }
            FetchPurpose::TemplateDialog(target) => {
                if self.dialogs.template_loaded(&mut self.page, &target, result) {
                    self.binder.rebind(&self.page);
                }
                Task::none()
            }
            FetchPurpose::Submission { correlation_id } => {
                match result {
                    Ok(_) => tracing::info!(%correlation_id, "dialog submission accepted"),
                    Err(error) => tracing::warn!(%correlation_id, %error, "dialog submission failed"),
                }
                Task::none()
            }
        }
    }

    /// New mainframe content may bring new triggers and tagged elements.
    fn after_completion(&mut self, completion: Completion) -> Task {
        match completion {
            Completion::Ignored => Task::none(),
            Completion::Loaded(task) => {
                self.refresh_bindings();
                task
            }
            Completion::Failed { error_rendered } => {
                if error_rendered {
                    self.refresh_bindings();
                }
                Task::none()
            }
        }
    }

    fn refresh_bindings(&mut self) {
        self.binder.rebind(&self.page);
        if let Some(width) = self.viewport_width {
            self.breakpoints.apply(&mut self.page, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::dialog::post_form;
    use crate::fetch::{FormField, Method};
    use crate::page::{DialogId, MemoryPage, VisualState};
    use crate::viewport::Breakpoint;
    use pretty_assertions::assert_eq;

    fn t(raw: &str) -> NavigationTarget {
        NavigationTarget::parse(raw).unwrap()
    }

    fn shell() -> Shell<MemoryPage> {
        let mut config = Config::default();
        config.transition.initial_target = "/home".to_string();
        Shell::new(&config, MemoryPage::new()).unwrap()
    }

    /// Run a task to completion, answering fetches from `pages` and firing
    /// delays in order. Watchdog delays are skipped.
    fn drive(shell: &mut Shell<MemoryPage>, task: Task, pages: &[(&str, &str)]) {
        let mut queue = task.into_vec();
        while !queue.is_empty() {
            let next = queue.remove(0);
            let follow = match next {
                Task::Delay {
                    message: Message::WatchdogElapsed { .. },
                    ..
                } => Task::none(),
                Task::Delay { message, .. } => shell.update(message),
                Task::Fetch { request, purpose } => {
                    let result = pages
                        .iter()
                        .find(|(url, _)| *url == request.url)
                        .map(|(_, body)| Fragment::new(*body))
                        .ok_or(FetchError::Status(404));
                    let result = match (&request.selector, result) {
                        (Some(id), Ok(fragment)) => fragment
                            .select_id(id)
                            .ok_or_else(|| FetchError::SelectorNotFound(id.clone())),
                        (_, result) => result,
                    };
                    shell.update(Message::Fetched { purpose, result })
                }
                other => other,
            };
            queue.extend(follow.into_vec());
        }
    }

    const PAGES: &[(&str, &str)] = &[
        ("/home", r#"<h1>home</h1><a data-href="/files">files</a>"#),
        ("/files", r#"<h1>files</h1><a data-href="/home">home</a><span data-bzs-hide-phone>x</span>"#),
    ];

    #[test]
    fn test_start_loads_initial_target_seamlessly() {
        let mut shell = shell();
        let task = shell.start();
        drive(&mut shell, task, PAGES);
        assert_eq!(shell.page().region_html(Region::Mainframe), Some(PAGES[0].1));
        assert!(shell.page().visual_log().is_empty());
        assert!(shell.binder().is_bound(&t("/files")));
        assert!(!shell.transitions().is_busy());
    }

    #[test]
    fn test_trigger_navigates_and_rebinds() {
        let mut shell = shell();
        let task = shell.start();
        drive(&mut shell, task, PAGES);

        let task = shell.update(Message::TriggerActivated(t("/files")));
        drive(&mut shell, task, PAGES);

        assert_eq!(shell.page().region_html(Region::Mainframe), Some(PAGES[1].1));
        assert_eq!(shell.transitions().history().back(), &[t("/home"), t("/files")]);
        assert!(shell.binder().is_bound(&t("/home")));
        assert!(!shell.binder().is_bound(&t("/files")));
        assert_eq!(
            shell.page().visual_log(),
            &[VisualState::FadeOutLeft, VisualState::FadeInRight]
        );
        assert!(!shell.transitions().is_busy());
    }

    #[test]
    fn test_unbound_trigger_is_ignored() {
        let mut shell = shell();
        let task = shell.update(Message::TriggerActivated(t("/files")));
        assert!(task.is_none());
        assert!(!shell.transitions().is_busy());
    }

    #[test]
    fn test_swipes_walk_history() {
        let mut shell = shell();
        let task = shell.start();
        drive(&mut shell, task, PAGES);
        let task = shell.update(Message::TriggerActivated(t("/files")));
        drive(&mut shell, task, PAGES);

        let task = shell.update(Message::Swipe(SwipeDirection::Right));
        drive(&mut shell, task, PAGES);
        assert_eq!(shell.transitions().last_access(), &t("/home"));
        assert_eq!(shell.transitions().history().forward(), &[t("/files")]);

        let task = shell.update(Message::Swipe(SwipeDirection::Left));
        drive(&mut shell, task, PAGES);
        assert_eq!(shell.transitions().last_access(), &t("/files"));
        assert!(shell.transitions().history().forward().is_empty());
    }

    #[test]
    fn test_viewport_reapplied_after_load() {
        let mut shell = shell();
        shell.update(Message::Resized(400));
        assert_eq!(shell.page().tag_visible(Breakpoint::Phone.tag()), Some(false));

        shell.page_mut().set_tag_visibility(Breakpoint::Phone.tag(), true);
        let task = shell.update(Message::NavigateSeamless(t("/files")));
        drive(&mut shell, task, PAGES);
        assert_eq!(shell.page().tag_visible(Breakpoint::Phone.tag()), Some(false));
    }

    #[test]
    fn test_missing_page_keeps_content() {
        let mut shell = shell();
        let task = shell.start();
        drive(&mut shell, task, PAGES);

        let task = shell.update(Message::Navigate {
            target: t("/missing"),
            reverse_direction: false,
            record_history: true,
        });
        drive(&mut shell, task, PAGES);

        assert!(!shell.transitions().is_busy());
        assert_eq!(shell.transitions().last_access(), &t("/home"));
        assert_eq!(shell.transitions().history().back(), &[t("/home")]);
        assert_eq!(shell.page().region_html(Region::Mainframe), Some(PAGES[0].1));
    }

    #[test]
    fn test_error_fragment_policy_binds_error_links() {
        let mut config = Config::default();
        config.transition.initial_target = "/home".to_string();
        config.transition.failure_policy = FailurePolicy::ErrorFragment;
        config.transition.error_fragment = r#"<p>404</p><a data-href="/home">back</a>"#.to_string();
        let mut shell = Shell::new(&config, MemoryPage::new()).unwrap();

        let task = shell.update(Message::Navigate {
            target: t("/missing"),
            reverse_direction: false,
            record_history: true,
        });
        drive(&mut shell, task, PAGES);
        assert!(shell.binder().is_bound(&t("/home")));
    }

    #[test]
    fn test_reload_index_fills_chrome_and_refreshes() {
        let index = r#"<div id="bzs-index-main-header">H</div><div id="bzs-index-main-sidebar"><a data-href="/settings">s</a></div><script id="bzs-index-scripts"></script>"#;
        let mut pages = PAGES.to_vec();
        pages.push(("/", index));

        let mut shell = shell();
        let task = shell.update(Message::ReloadIndex);
        drive(&mut shell, task, &pages);

        assert_eq!(
            shell.page().region_html(Region::IndexHeader),
            Some(r#"<div id="bzs-index-main-header">H</div>"#)
        );
        assert_eq!(
            shell.page().region_html(Region::IndexScripts),
            Some(r#"<script id="bzs-index-scripts"></script>"#)
        );
        assert!(shell.binder().is_bound(&t("/settings")));
        assert_eq!(shell.page().region_html(Region::Mainframe), Some(PAGES[0].1));
    }

    #[test]
    fn test_template_dialog_round_trip() {
        let mut shell = shell();
        let pages = [("/files/preview/1", r#"<p>preview</p><a data-href="/files">open</a>"#)];
        let task = shell.update(Message::LoadTemplateDialog(t("/files/preview/1")));
        drive(&mut shell, task, &pages);
        assert!(shell.page().dialog_visible(DialogId::Template));
        assert!(shell.binder().is_bound(&t("/files")));

        shell.update(Message::UnloadTemplateDialog);
        assert!(!shell.page().dialog_visible(DialogId::Template));
    }

    #[test]
    fn test_input_dialog_submission_posts() {
        let mut shell = shell();
        shell.load_input_dialog("New folder", "untitled", "/files/mkdir", "u-3", Box::new(post_form));
        let task = shell.update(Message::SubmitInputDialog(vec![FormField::new("name", "docs")]));
        let Task::Fetch { request, .. } = task else {
            panic!("expected a fetch");
        };
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.form, vec![FormField::new("name", "docs")]);
    }
}
