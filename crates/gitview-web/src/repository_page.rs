//! The repository page controller.
//!
//! Every repository page is bound to the `r`, `h` and `f` parameters.
//! Opening a page resolves the repository and its model for the session
//! user, builds the navigation links and installs the search form;
//! [`RepositoryPage::finish`] releases the repository and hands the page
//! chrome to the template.

use gitview_storage::{get_all_refs, get_commit, get_ticket_branch, Commit, ObjectId, RefModel, Repository};
use gitview_types::{ChangeType, PersonIdent, RepositoryModel, SearchType};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WebError;
use crate::messages::get_string;
use crate::pages::{
    disable_registered_page_link, get_link_id, registration, NavLink, STANDARD_LINKS,
};
use crate::params::PageParameters;
use crate::person::{change_type_tooltip, create_person_panel, PersonPanel};
use crate::routes::WebState;
use crate::search::SearchForm;
use crate::session::Session;
use crate::syndication::{self, DiscoveryLink};

/// Length of abbreviated object ids.
const SHORT_ID_LEN: usize = 8;

/// Separator rendered before each extra link.
const EXTRA_LINK_SEPARATOR: &str = " | ";

/// Layout data shared by every page.
#[derive(Debug, Clone)]
pub struct PageChrome {
    /// Site name.
    pub site_name: String,
    /// Page header, `{repository} / {page}` on repository pages.
    pub title: String,
    /// Logged in user, if any.
    pub username: Option<String>,
    /// Repository name, empty outside repository pages.
    pub repository_name: String,
    /// Standard navigation links.
    pub nav_links: Vec<NavLink>,
    /// Feature dependent links, each preceded by a separator.
    pub extra_links: Vec<NavLink>,
    /// Feed link.
    pub syndication_link: String,
    /// Search form, on repository pages.
    pub search_form: Option<SearchForm>,
    /// Feed discovery link for the page head.
    pub discovery: Option<DiscoveryLink>,
}

impl PageChrome {
    /// Chrome for pages outside a repository.
    pub fn site(state: &WebState, session: &Session, title: &str) -> Self {
        Self {
            site_name: state.settings.site_name.clone(),
            title: title.to_string(),
            username: session.username().map(str::to_string),
            repository_name: String::new(),
            nav_links: Vec::new(),
            extra_links: Vec::new(),
            syndication_link: String::new(),
            search_form: None,
            discovery: None,
        }
    }
}

/// A repository page being built for one request.
pub struct RepositoryPage {
    state: WebState,
    session: Session,
    page_name: String,
    repository_name: String,
    object_id: Option<String>,
    repository: Option<Arc<Repository>>,
    model: RepositoryModel,
    show_admin: bool,
    nav_links: Vec<NavLink>,
    extra_links: Vec<NavLink>,
    syndication_link: String,
    search_form: SearchForm,
    discovery: Option<DiscoveryLink>,
}

impl RepositoryPage {
    /// Opens the page `translation_key` (e.g. `gb.log`) for `params`.
    pub fn open(
        state: &WebState,
        session: Session,
        translation_key: &str,
        params: &PageParameters,
    ) -> Result<Self, WebError> {
        let page_name = get_string(translation_key).to_string();
        let repository_name = params.repository_name().to_string();

        if repository_name.is_empty() {
            return Err(WebError::BadRequest(format!(
                "Repository not specified for {}!",
                page_name
            )));
        }

        let repository = state
            .repos
            .get(&repository_name)
            .map_err(|_| WebError::NotFound(format!("Can not load repository {}", repository_name)))?;

        let model = state
            .repository_model(session.user(), &repository)
            .ok_or_else(|| {
                let message = format!("Unauthorized access for repository {}", repository_name);
                if session.is_logged_in() {
                    WebError::Forbidden(message)
                } else {
                    WebError::Unauthorized(message)
                }
            })?;

        let settings = &state.settings;
        let show_admin = show_admin(
            settings.authenticate_admin_pages,
            settings.allow_administration,
            session.can_admin(),
        );

        // standard page links
        let mut nav_links: Vec<NavLink> = STANDARD_LINKS
            .iter()
            .filter_map(|key| registration(key))
            .map(|page| NavLink::registered(page, &repository_name))
            .collect();

        // per-repository extra page links
        let has_ticket_branch = model.use_tickets && get_ticket_branch(&repository)?.is_some();
        let is_owner = session
            .username()
            .is_some_and(|username| model.is_owner(username));
        let page_link_id = get_link_id(&page_name);
        let extra_links = extra_link_keys(has_ticket_branch, model.use_docs, show_admin || is_owner)
            .into_iter()
            .filter_map(registration)
            .map(|page| NavLink {
                enabled: Some(page.key) != page_link_id,
                separator: Some(EXTRA_LINK_SEPARATOR),
                ..NavLink::registered(page, &repository_name)
            })
            .collect();

        let syndication_link = syndication::as_link("", &repository_name, None, 0);

        // disable current page
        disable_registered_page_link(&mut nav_links, &page_name);

        let search_form = SearchForm::new(&repository_name, settings.show_search_type_selection);

        tracing::debug!(
            repository = %repository_name,
            page = %page_name,
            user = session.username().unwrap_or("anonymous"),
            "Opened repository page"
        );

        Ok(Self {
            state: state.clone(),
            session,
            page_name,
            repository_name,
            object_id: params.object().map(str::to_string),
            repository: Some(repository),
            model,
            show_admin,
            nav_links,
            extra_links,
            syndication_link,
            search_form,
            discovery: None,
        })
    }

    /// Translated page name.
    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    /// Repository name from the `r` parameter.
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Object id from the `h` parameter.
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Repository model as seen by the session user.
    pub fn model(&self) -> &RepositoryModel {
        &self.model
    }

    /// The session of the request.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shared front-end state.
    pub fn state(&self) -> &WebState {
        &self.state
    }

    /// True when administration links are shown.
    pub fn show_admin(&self) -> bool {
        self.show_admin
    }

    /// Standard navigation links.
    pub fn nav_links(&self) -> &[NavLink] {
        &self.nav_links
    }

    /// Extra navigation links.
    pub fn extra_links(&self) -> &[NavLink] {
        &self.extra_links
    }

    /// The open repository.
    pub fn repository(&self) -> Result<&Repository, WebError> {
        self.repository.as_deref().ok_or_else(|| {
            WebError::Internal(format!("repository {} already released", self.repository_name))
        })
    }

    /// Resolves the `h` parameter (HEAD when absent) to a commit.
    pub fn get_commit(&self) -> Result<Commit, WebError> {
        get_commit(self.repository()?, self.object_id())?.ok_or_else(|| {
            WebError::NotFound(format!(
                "Failed to find commit \"{}\" in {} for {} page!",
                self.object_id().unwrap_or("HEAD"),
                self.repository_name,
                self.page_name
            ))
        })
    }

    /// The first eight characters of an object id.
    pub fn get_short_object_id(object_id: &str) -> String {
        object_id.chars().take(SHORT_ID_LEN).collect()
    }

    /// All refs of the repository grouped by commit.
    pub fn all_refs(&self) -> Result<HashMap<ObjectId, Vec<RefModel>>, WebError> {
        Ok(get_all_refs(self.repository()?)?)
    }

    /// Refs pointing at `commit`.
    pub fn refs_for(&self, commit: &Commit) -> Result<Vec<RefModel>, WebError> {
        Ok(self.all_refs()?.remove(&commit.id).unwrap_or_default())
    }

    /// Renders message text as HTML, either through the commit message
    /// processor or by breaking lines only.
    pub fn full_text(&self, text: &str, substitute_regex: bool) -> String {
        if substitute_regex {
            self.state.messages.process(&self.repository_name, text)
        } else {
            gitview_utils::break_lines_for_html(text)
        }
    }

    /// Person panel linking to searches of `search_type`.
    pub fn create_person_panel(&self, ident: &PersonIdent, search_type: SearchType) -> PersonPanel {
        create_person_panel(
            &self.repository_name,
            self.object_id(),
            ident,
            search_type,
            self.state.settings.show_email_addresses,
        )
    }

    /// Tooltip describing a change type.
    pub fn change_type_tooltip(&self, change_type: ChangeType) -> &'static str {
        change_type_tooltip(change_type)
    }

    /// Parameters naming this repository.
    pub fn new_repository_parameter(&self) -> PageParameters {
        PageParameters::new_repository_parameter(&self.repository_name)
    }

    /// Parameters naming a commit of this repository; `None` uses `h`.
    pub fn new_commit_parameter(&self, commit_id: Option<&str>) -> PageParameters {
        PageParameters::new_object_parameter(
            &self.repository_name,
            commit_id.or(self.object_id()),
        )
    }

    /// Parameters naming a path at the current object.
    pub fn new_path_parameter(&self, path: &str) -> PageParameters {
        PageParameters::new_path_parameter(&self.repository_name, self.object_id(), path)
    }

    /// Adds an RSS discovery link for the current object to the page head.
    pub fn add_syndication_discovery_link(&mut self) {
        self.discovery = Some(DiscoveryLink {
            title: syndication::get_title(&self.repository_name, self.object_id()),
            href: syndication::as_link("", &self.repository_name, self.object_id(), 0),
        });
    }

    /// Releases the repository and returns the page chrome.
    pub fn finish(mut self) -> PageChrome {
        self.repository = None;
        PageChrome {
            site_name: self.state.settings.site_name.clone(),
            title: format!("{} / {}", self.repository_name, self.page_name),
            username: self.session.username().map(str::to_string),
            repository_name: self.repository_name,
            nav_links: self.nav_links,
            extra_links: self.extra_links,
            syndication_link: self.syndication_link,
            search_form: Some(self.search_form),
            discovery: self.discovery,
        }
    }
}

/// Whether administration links are shown.
pub fn show_admin(authenticate_admin_pages: bool, allow_administration: bool, can_admin: bool) -> bool {
    if authenticate_admin_pages {
        allow_administration && can_admin
    } else {
        allow_administration
    }
}

/// Extra link ids, in display order.
pub fn extra_link_keys(tickets: bool, docs: bool, edit: bool) -> Vec<&'static str> {
    [("tickets", tickets), ("docs", docs), ("edit", edit)]
        .into_iter()
        .filter_map(|(key, shown)| shown.then_some(key))
        .collect()
}
