//! Guest side of the event-loop API.
//!
//! Each [`EventLoop`] owns a host session. Its callback is kept in a thread-local table keyed by
//! session id and invoked from the exported `event_loop_cb`. A callback is taken out of the table
//! while it runs, so it may freely open, arm or shut down loops (including its own).

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{Event, sys};

pub type Callback = Box<dyn FnMut(Event, &mut EventLoop)>;

struct Entry {
    /// `None` while the callback is running.
    callback: Option<Callback>,
}

thread_local! {
    static CALLBACKS: RefCell<BTreeMap<u32, Entry>> = const { RefCell::new(BTreeMap::new()) };
}

/// Handle to one host session.
#[derive(Debug, Eq, PartialEq)]
pub struct EventLoop {
    id: u32,
}

impl EventLoop {
    /// Open a session that reports pointer moves, key presses and requested frames to
    /// `callback`. Returns `None` when the host has no ids left.
    pub fn new(callback: impl FnMut(Event, &mut EventLoop) + 'static) -> Option<EventLoop> {
        let id = unsafe { sys::event_loop_new() };
        if id == 0 {
            return None;
        }
        register(id, Box::new(callback));
        Some(EventLoop { id })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Ask for one [`Event::AnimationFrame`] on the next display refresh.
    pub fn request_animation_frame(&mut self) -> bool {
        unsafe { sys::event_loop_raf(self.id) != 0 }
    }

    /// Close the session. The callback still receives [`Event::Destroyed`] once, after which it
    /// is dropped.
    pub fn shutdown(&mut self) -> bool {
        unsafe { sys::event_loop_shutdown(self.id) != 0 }
    }
}

pub(crate) fn register(id: u32, callback: Callback) {
    CALLBACKS.with(|table| {
        table.borrow_mut().insert(
            id,
            Entry {
                callback: Some(callback),
            },
        );
    });
}

/// Route one `event_loop_cb` call to its session's callback.
///
/// Unknown ids, unknown kinds and re-entrant calls for a session whose callback is already
/// running are ignored.
pub(crate) fn dispatch(id: u32, kind: u32, p0: u32, p1: u32, p2: u32) {
    let Some(event) = Event::decode(kind, p0, p1, p2) else {
        return;
    };
    let taken = CALLBACKS.with(|table| {
        table
            .borrow_mut()
            .get_mut(&id)
            .and_then(|entry| entry.callback.take())
    });
    let Some(mut callback) = taken else {
        return;
    };

    let mut handle = EventLoop { id };
    callback(event, &mut handle);

    CALLBACKS.with(|table| {
        let mut table = table.borrow_mut();
        if event == Event::Destroyed {
            table.remove(&id);
        } else if let Some(entry) = table.get_mut(&id) {
            entry.callback = Some(callback);
        }
    });
}

#[cfg(test)]
fn is_registered(id: u32) -> bool {
    CALLBACKS.with(|table| table.borrow().contains_key(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind;
    use std::rc::Rc;

    fn recorder(id: u32) -> Rc<RefCell<Vec<Event>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        register(
            id,
            Box::new(move |event, handle: &mut EventLoop| {
                assert_eq!(handle.id(), id);
                sink.borrow_mut().push(event);
            }),
        );
        seen
    }

    #[test]
    fn routes_events_to_their_session() {
        let first = recorder(1);
        let second = recorder(2);

        dispatch(1, kind::MOUSE_MOVE, 10, 20, 0);
        dispatch(2, kind::ANIMATION_FRAME, 0, 0, 0);
        dispatch(1, kind::ANIMATION_FRAME, 0, 0, 0);

        assert_eq!(
            *first.borrow(),
            vec![Event::MouseMove { x: 10, y: 20 }, Event::AnimationFrame]
        );
        assert_eq!(*second.borrow(), vec![Event::AnimationFrame]);
    }

    #[test]
    fn ignores_unknown_sessions_and_kinds() {
        let seen = recorder(7);
        dispatch(8, kind::ANIMATION_FRAME, 0, 0, 0);
        dispatch(7, 42, 0, 0, 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn destroyed_is_the_last_event() {
        let seen = recorder(3);
        dispatch(3, kind::DESTROYED, 0, 0, 0);
        assert!(!is_registered(3));

        dispatch(3, kind::ANIMATION_FRAME, 0, 0, 0);
        assert_eq!(*seen.borrow(), vec![Event::Destroyed]);
    }

    #[test]
    fn reentrant_dispatch_is_dropped() {
        let count = Rc::new(RefCell::new(0));
        let inner = Rc::clone(&count);
        register(
            4,
            Box::new(move |_, _: &mut EventLoop| {
                *inner.borrow_mut() += 1;
                dispatch(4, kind::ANIMATION_FRAME, 0, 0, 0);
            }),
        );

        dispatch(4, kind::ANIMATION_FRAME, 0, 0, 0);
        dispatch(4, kind::ANIMATION_FRAME, 0, 0, 0);
        assert_eq!(*count.borrow(), 2);
    }
}
