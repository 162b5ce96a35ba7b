//! Dismissible overlays (dropdowns, row menus, popovers)
//!
//! One open/closed state plus a close callback, shared by every menu that
//! should close when the user interacts somewhere else. The host decides
//! whether a pointer event landed inside the overlay and forwards that to
//! [`DismissibleOverlay::handle_pointer_down`].

use std::fmt;

use tracing::debug;

pub type CloseCallback<K> = Box<dyn FnMut(&K) + Send>;

pub struct DismissibleOverlay<K> {
    name: &'static str,
    open: Option<K>,
    on_close: Option<CloseCallback<K>>,
}

impl<K: PartialEq + Clone + fmt::Debug> DismissibleOverlay<K> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            open: None,
            on_close: None,
        }
    }

    /// Set the callback invoked every time an open overlay closes
    pub fn with_on_close<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&K) + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Open `key`, replacing (and closing) whatever was open before
    pub fn open(&mut self, key: K) {
        if self.open.as_ref() == Some(&key) {
            return;
        }
        self.close();
        debug!(overlay = self.name, ?key, "Overlay opened");
        self.open = Some(key);
    }

    /// Close if `key` is the open one, otherwise open it
    pub fn toggle(&mut self, key: K) {
        if self.open.as_ref() == Some(&key) {
            self.close();
        } else {
            self.open(key);
        }
    }

    /// Close the open overlay. Returns the key that was open.
    pub fn close(&mut self) -> Option<K> {
        let closed = self.open.take()?;
        debug!(overlay = self.name, key = ?closed, "Overlay closed");
        if let Some(on_close) = self.on_close.as_mut() {
            on_close(&closed);
        }
        Some(closed)
    }

    /// Pointer went down somewhere. Closes when it landed outside the overlay.
    ///
    /// Returns true if the overlay was dismissed.
    pub fn handle_pointer_down(&mut self, inside_overlay: bool) -> bool {
        if self.open.is_none() || inside_overlay {
            return false;
        }
        self.close().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_open_for(&self, key: &K) -> bool {
        self.open.as_ref() == Some(key)
    }

    pub fn current(&self) -> Option<&K> {
        self.open.as_ref()
    }
}
