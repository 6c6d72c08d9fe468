//! Browser binding: finds the chat markup, builds the controller over it and
//! routes DOM events into the controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page ships the form, input, message container, clear button and tab
//! strip; this module never creates them. The controller is shared by the
//! listeners as `Rc<RefCell<_>>` and is never borrowed across the request
//! await (see `dispatch_submit`).

mod surface;

pub use surface::{DomSurface, InputField};

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent};

use crate::config::WidgetConfig;
use crate::controller::{ChatController, KeyAction, key_action};
use crate::net::api::{ChatTransport, HttpChatTransport};
use crate::state::tabs::TabSet;
use crate::util::storage::{KeyValueStore, LocalStore, UnavailableStore};

type WidgetController = ChatController<Box<dyn KeyValueStore>, DomSurface>;
type SharedController = Rc<RefCell<WidgetController>>;

thread_local! {
    static MOUNTED: RefCell<Option<MountedWidget>> = const { RefCell::new(None) };
}

/// Why the widget could not attach to the page.
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("no browser document")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error("element #{0} has the wrong type")]
    WrongElement(String),
    #[error("failed to attach {event} listener: {detail}")]
    Listener { event: &'static str, detail: String },
}

/// An event listener that stays attached until `detach`.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, MountError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| MountError::Listener { event, detail: format!("{e:?}") })?;
        Ok(Self { target: target.clone(), event, callback })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// A widget attached to the page.
pub struct MountedWidget {
    controller: SharedController,
    listeners: Vec<Listener>,
}

impl MountedWidget {
    /// Detach every listener and dispose the controller.
    pub fn dispose(self) {
        for listener in &self.listeners {
            listener.detach();
        }
        self.controller.borrow_mut().dispose();
    }
}

/// Mount now if the document has parsed, otherwise on `DOMContentLoaded`.
pub fn start_when_ready() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(boot);
        let _ = document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    } else {
        boot();
    }
}

/// Dispose the widget mounted by [`start_when_ready`], if any.
pub fn dispose_mounted() {
    let widget = MOUNTED.with(|slot| slot.borrow_mut().take());
    if let Some(widget) = widget {
        widget.dispose();
    }
}

fn boot() {
    let (config, config_error) = match read_config() {
        Ok(config) => (config, None),
        Err(e) => (WidgetConfig::default(), Some(e)),
    };
    if let Some(level) = config.log_level.to_level() {
        let _ = console_log::init_with_level(level);
    }
    if let Some(e) = config_error {
        log::error!("ignoring widget configuration: {e}");
    }

    match mount(config) {
        Ok(widget) => MOUNTED.with(|slot| *slot.borrow_mut() = Some(widget)),
        Err(e) => log::error!("chat widget not mounted: {e}"),
    }
}

/// Read `data-*` overrides from the message container.
fn read_config() -> Result<WidgetConfig, crate::error::ConfigError> {
    let defaults = crate::config::ElementIds::default();
    let container = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&defaults.messages));
    WidgetConfig::from_lookup(|key| {
        container
            .as_ref()
            .and_then(|el| el.get_attribute(&format!("data-{key}")))
    })
}

/// Attach the widget to the page described by `config.elements`.
///
/// # Errors
///
/// Returns a [`MountError`] when required markup is missing or a listener
/// cannot be attached. Nothing is left attached on error.
pub fn mount(config: WidgetConfig) -> Result<MountedWidget, MountError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(MountError::NoDocument)?;
    let ids = config.elements.clone();

    let form = element_by_id(&document, &ids.form)?;
    let input = input_field(&document, &ids.input)?;
    let messages: HtmlElement = element_by_id(&document, &ids.messages)?
        .dyn_into()
        .map_err(|_| MountError::WrongElement(ids.messages.clone()))?;
    let clear_button = element_by_id(&document, &ids.clear_button)?;

    let tab_buttons = elements_by_class(&document, &ids.tab_button_class);
    let tab_panels = elements_by_class(&document, &ids.tab_panel_class);
    let tab_ids: Vec<String> = tab_buttons
        .iter()
        .map(|b| b.get_attribute("data-tab").unwrap_or_default())
        .collect();
    let panel_ids: Vec<String> = tab_panels.iter().map(Element::id).collect();

    let store: Box<dyn KeyValueStore> = match LocalStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::error!("chat history will not be saved: {e}");
            Box::new(UnavailableStore)
        }
    };
    let transport = Rc::new(HttpChatTransport::new(config.endpoint.clone()));
    let surface = DomSurface::new(input.clone(), messages, tab_buttons.clone(), tab_panels);
    let controller: SharedController = Rc::new(RefCell::new(
        ChatController::new(config, store, surface).with_tabs(TabSet::new(tab_ids.clone(), panel_ids)),
    ));

    let mut listeners = Vec::new();
    let attached = attach_listeners(&mut listeners, &controller, &transport, &form, &input, &clear_button, &tab_buttons, tab_ids);
    if let Err(e) = attached {
        for listener in &listeners {
            listener.detach();
        }
        return Err(e);
    }

    controller.borrow_mut().initialize();
    log::debug!("chat widget mounted with {} tab(s)", tab_buttons.len());
    Ok(MountedWidget { controller, listeners })
}

#[allow(clippy::too_many_arguments)]
fn attach_listeners(
    listeners: &mut Vec<Listener>,
    controller: &SharedController,
    transport: &Rc<HttpChatTransport>,
    form: &Element,
    input: &InputField,
    clear_button: &Element,
    tab_buttons: &[Element],
    tab_ids: Vec<String>,
) -> Result<(), MountError> {
    {
        let controller = Rc::clone(controller);
        let transport = Rc::clone(transport);
        listeners.push(Listener::attach(form.as_ref(), "submit", move |ev: Event| {
            ev.prevent_default();
            dispatch_submit(&controller, &transport);
        })?);
    }

    {
        let controller = Rc::clone(controller);
        let transport = Rc::clone(transport);
        let target: &EventTarget = match input {
            InputField::Input(el) => el.as_ref(),
            InputField::TextArea(el) => el.as_ref(),
        };
        listeners.push(Listener::attach(target, "keydown", move |ev: Event| {
            let Some(key_ev) = ev.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key_action(&key_ev.key(), key_ev.shift_key()) == KeyAction::Submit {
                ev.prevent_default();
                dispatch_submit(&controller, &transport);
            }
        })?);
    }

    {
        let controller = Rc::clone(controller);
        listeners.push(Listener::attach(clear_button.as_ref(), "click", move |_| {
            controller.borrow_mut().clear();
        })?);
    }

    for (button, tab_id) in tab_buttons.iter().zip(tab_ids) {
        let controller = Rc::clone(controller);
        listeners.push(Listener::attach(button.as_ref(), "click", move |_| {
            controller.borrow_mut().switch_tab(&tab_id);
        })?);
    }

    Ok(())
}

/// Start an exchange and finish it when the endpoint answers.
fn dispatch_submit(controller: &SharedController, transport: &Rc<HttpChatTransport>) {
    let Some(request) = controller.borrow_mut().begin_submit() else {
        return;
    };
    let controller = Rc::clone(controller);
    let transport = Rc::clone(transport);
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = transport.send(&request).await;
        controller.borrow_mut().finish_submit(outcome);
    });
}

fn element_by_id(document: &Document, id: &str) -> Result<Element, MountError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| MountError::MissingElement(id.to_owned()))
}

fn input_field(document: &Document, id: &str) -> Result<InputField, MountError> {
    let el = element_by_id(document, id)?;
    let el = match el.dyn_into::<HtmlInputElement>() {
        Ok(input) => return Ok(InputField::Input(input)),
        Err(el) => el,
    };
    el.dyn_into::<HtmlTextAreaElement>()
        .map(InputField::TextArea)
        .map_err(|_| MountError::WrongElement(id.to_owned()))
}

fn elements_by_class(document: &Document, class: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(&format!(".{class}")) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
