use std::{cell::RefCell, rc::Rc};

use tracing::{debug, info};

use super::{HostLocales, Locale};

type ChangedHandler = Rc<dyn Fn(Locale)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

struct Inner {
    active: Locale,
    next_handler_id: usize,
    handlers: Vec<(HandlerId, ChangedHandler)>,
    watchers: Vec<async_channel::Sender<Locale>>,
}

/// The active locale, shared by every screen that renders text.
///
/// Cloning gives another handle to the same state. `set_active` is the only
/// writer; consumers either read snapshots through `active` or subscribe with
/// `connect_changed` / `watch` to re-render when the language switches.
#[derive(Clone)]
pub struct LocaleStore {
    inner: Rc<RefCell<Inner>>,
}

impl LocaleStore {
    pub fn new(locale: Locale) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                active: locale,
                next_handler_id: 0,
                handlers: vec![],
                watchers: vec![],
            })),
        }
    }

    /// Start with the first host-preferred language if we ship it, else `default`.
    pub fn from_host(host: &dyn HostLocales, default: Locale) -> Self {
        let preferred = host.preferred_locales();
        let locale = preferred
            .first()
            .and_then(|tag| Locale::from_tag(tag))
            .unwrap_or(default);
        info!(?preferred, %locale, "Resolved initial locale from host");
        Self::new(locale)
    }

    pub fn active(&self) -> Locale {
        self.inner.borrow().active
    }

    /// Switch the active locale. Returns whether anything changed; setting the
    /// current locale again notifies nobody.
    pub fn set_active(&self, locale: Locale) -> bool {
        let handlers = {
            let mut inner = self.inner.borrow_mut();
            if inner.active == locale {
                return false;
            }
            let previous = inner.active;
            inner.active = locale;
            info!(%previous, %locale, "Active locale changed");

            inner
                .watchers
                .retain(|sender| sender.try_send(locale).is_ok());
            inner
                .handlers
                .iter()
                .map(|(_, handler)| handler.clone())
                .collect::<Vec<_>>()
        };
        // borrow released: handlers may read the store
        for handler in handlers {
            handler(locale);
        }
        true
    }

    pub fn connect_changed<F: Fn(Locale) + 'static>(&self, f: F) -> HandlerId {
        let mut inner = self.inner.borrow_mut();
        let id = HandlerId(inner.next_handler_id);
        inner.next_handler_id += 1;
        inner.handlers.push((id, Rc::new(f)));
        id
    }

    pub fn disconnect(&self, id: HandlerId) {
        let mut inner = self.inner.borrow_mut();
        inner.handlers.retain(|(handler_id, _)| *handler_id != id);
        debug!(?id, remaining = inner.handlers.len(), "Locale handler disconnected");
    }

    /// A stream of locale changes for async consumers. Dropping the receiver
    /// unsubscribes it.
    pub fn watch(&self) -> async_channel::Receiver<Locale> {
        let (sender, receiver) = async_channel::unbounded();
        let mut inner = self.inner.borrow_mut();
        inner.watchers.retain(|sender| !sender.is_closed());
        inner.watchers.push(sender);
        receiver
    }

    /// Entries for a language picker: every shipped locale, its name in its
    /// own language, and whether it is the active one.
    pub fn choices(&self) -> Vec<(Locale, &'static str, bool)> {
        let active = self.active();
        Locale::ALL
            .into_iter()
            .map(|locale| (locale, locale.native_name(), locale == active))
            .collect()
    }
}

impl Default for LocaleStore {
    fn default() -> Self {
        Self::new(Locale::FALLBACK)
    }
}

impl std::fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LocaleStore")
            .field("active", &inner.active)
            .field("handlers", &inner.handlers.len())
            .field("watchers", &inner.watchers.len())
            .finish()
    }
}
