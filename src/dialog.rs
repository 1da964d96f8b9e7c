// Modal dialogs: the input-string form dialog and the shared template dialog
use crate::error::FetchError;
use crate::fetch::{FetchRequest, FormField};
use crate::fragment::Fragment;
use crate::message::FetchPurpose;
use crate::page::{DialogId, InputDialogChrome, Page, Region};
use crate::target::NavigationTarget;
use crate::task::Task;

/// Called with `(action, correlation_id, fields)` when the input dialog is submitted.
pub type SubmitHandler = Box<dyn FnMut(&str, &str, &[FormField]) -> Task>;

/// The active input dialog: what is shown and where the answer goes.
pub struct InputDialogSession {
    pub title: String,
    pub placeholder: String,
    pub submit_action: String,
    pub correlation_id: String,
    on_submit: SubmitHandler,
}

#[derive(Default)]
pub struct DialogController {
    input: Option<InputDialogSession>,
    template_target: Option<NavigationTarget>,
}

impl DialogController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_session(&self) -> Option<&InputDialogSession> {
        self.input.as_ref()
    }

    /// Replace the input dialog session. The previous submit handler is
    /// dropped, so only the newest one can ever fire.
    pub fn load_input_dialog(
        &mut self,
        page: &mut dyn Page,
        title: impl Into<String>,
        placeholder: impl Into<String>,
        submit_action: impl Into<String>,
        correlation_id: impl Into<String>,
        on_submit: SubmitHandler,
    ) {
        let session = InputDialogSession {
            title: title.into(),
            placeholder: placeholder.into(),
            submit_action: submit_action.into(),
            correlation_id: correlation_id.into(),
            on_submit,
        };
        page.set_input_dialog_chrome(&InputDialogChrome {
            title: session.title.clone(),
            placeholder: session.placeholder.clone(),
            action: session.submit_action.clone(),
            correlation_id: session.correlation_id.clone(),
        });
        self.input = Some(session);
    }

    /// Handle a form submission instead of letting it post natively.
    pub fn submit_input_dialog(&mut self, fields: &[FormField]) -> Task {
        match self.input.as_mut() {
            Some(session) => (session.on_submit)(&session.submit_action, &session.correlation_id, fields),
            None => {
                tracing::debug!("input dialog submitted with no session loaded");
                Task::none()
            }
        }
    }

    pub fn load_template_dialog(&mut self, target: NavigationTarget) -> Task {
        self.template_target = Some(target.clone());
        Task::fetch(FetchRequest::get(&target), FetchPurpose::TemplateDialog(target))
    }

    /// Show fetched template content. Responses for a superseded load are dropped.
    pub fn template_loaded(
        &mut self,
        page: &mut dyn Page,
        target: &NavigationTarget,
        result: Result<Fragment, FetchError>,
    ) -> bool {
        if self.template_target.as_ref() != Some(target) {
            return false;
        }
        self.template_target = None;
        match result {
            Ok(fragment) => {
                page.replace_region(Region::TemplateDialogContent, fragment.html());
                page.set_dialog_visible(DialogId::Template, true);
                true
            }
            Err(error) => {
                tracing::warn!(dialog_target = %target, %error, "template dialog load failed");
                false
            }
        }
    }

    /// Hide the template dialog. Its content stays in place.
    pub fn unload_template_dialog(&mut self, page: &mut dyn Page) {
        page.set_dialog_visible(DialogId::Template, false);
    }

    pub fn load_loading_dialog(&mut self, page: &mut dyn Page, title: &str) {
        self.template_target = None;
        page.replace_region(Region::TemplateDialogContent, &loading_markup(title));
        page.set_dialog_visible(DialogId::Template, true);
    }

    pub fn unload_loading_dialog(&mut self, page: &mut dyn Page) {
        page.set_dialog_visible(DialogId::Template, false);
    }
}

/// Build a form POST for a dialog answer. The host fetcher adds the CSRF token.
pub fn post_form(action: &str, correlation_id: &str, fields: &[FormField]) -> Task {
    Task::fetch(
        FetchRequest::post_form(action, fields.to_vec()),
        FetchPurpose::Submission {
            correlation_id: correlation_id.to_string(),
        },
    )
}

fn loading_markup(title: &str) -> String {
    format!(
        concat!(
            r#"<div class="modal-header"><button type="button" class="close" data-dismiss="modal"><span>&times;</span></button>"#,
            r#"<h4 class="modal-title">{}</h4></div>"#,
            r#"<div class="modal-body"><p>Please do not close this dialog while the server processes the operation.</p>"#,
            r#"<div class="progress active"><div class="progress-bar progress-bar-primary progress-bar-striped" style="width:100%"></div></div></div>"#
        ),
        v_htmlescape::escape(title)
    )
}
