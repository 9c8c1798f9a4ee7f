//! Event-loop session registry.
//!
//! A guest opens any number of sessions. Each session can ask for one notification on the
//! next display refresh, and is subscribed to pointer-move and keyboard input for as long as
//! it lives. All of it reaches the guest through the single `event_loop_cb` export,
//! disambiguated by session id and [`EventKind`](crate::abi::EventKind).
//!
//! The registry is pure bookkeeping: it decides *who* gets *what*. Calling into the guest is
//! the host's job (see [`crate::host::Host`]), which keeps the registry testable without
//! a WASM instance.

mod events;

pub use events::{GuestEvent, InputEvent, KeyPayload, KeyboardEvent};

use std::collections::{BTreeMap, VecDeque};

/// Session identifier handed to the guest. Starts at 1; 0 is never issued.
pub type SessionId = u32;

/// Handle of one armed animation-frame request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameToken(u64);

/// Which window listener an input event is routed through.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ListenerKind {
    PointerMove,
    Keyboard,
}

/// Listener attachment state of one session.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Listeners {
    pub pointer_move: bool,
    pub keyboard: bool,
}

impl Listeners {
    fn attached(&self, kind: ListenerKind) -> bool {
        match kind {
            ListenerKind::PointerMove => self.pointer_move,
            ListenerKind::Keyboard => self.keyboard,
        }
    }
}

#[derive(Debug)]
struct Session {
    frame: Option<FrameToken>,
    listeners: Listeners,
}

/// Work queued for the next free tick of the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Task {
    /// Deliver the final `DESTROYED` callback of a closed session.
    Destroyed(SessionId),
}

/// Live sessions plus the frame and task queues that feed them.
#[derive(Debug, Default)]
pub struct Registry {
    counter: SessionId,
    sessions: BTreeMap<SessionId, Session>,
    next_token: u64,
    /// Armed frame requests, in the order they were made.
    frames: BTreeMap<FrameToken, SessionId>,
    tasks: VecDeque<Task>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session and subscribe it to pointer and keyboard input.
    ///
    /// Returns `None` once the id space is exhausted; ids are never recycled.
    pub fn open(&mut self) -> Option<SessionId> {
        let id = self.counter.checked_add(1)?;
        self.counter = id;
        self.sessions.insert(
            id,
            Session {
                frame: None,
                listeners: Listeners {
                    pointer_move: true,
                    keyboard: true,
                },
            },
        );
        tracing::debug!(id, "event loop opened");
        Some(id)
    }

    /// Arm a one-shot animation frame for `id`.
    ///
    /// A request made while one is already pending coalesces into it. Returns false for
    /// unknown or closed sessions.
    pub fn request_frame(&mut self, id: SessionId) -> bool {
        let Some(session) = self.sessions.get_mut(&id) else {
            return false;
        };
        if session.frame.is_some() {
            return true;
        }
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        session.frame = Some(token);
        self.frames.insert(token, id);
        true
    }

    /// Close `id`: cancel its frame, detach its listeners, forget it and queue the final
    /// `DESTROYED` delivery. Returns false for unknown or already closed sessions.
    pub fn shutdown(&mut self, id: SessionId) -> bool {
        // Removing the entry also detaches both listeners.
        let Some(session) = self.sessions.remove(&id) else {
            return false;
        };
        if let Some(token) = session.frame {
            self.frames.remove(&token);
        }
        self.tasks.push_back(Task::Destroyed(id));
        tracing::debug!(id, "event loop shut down");
        true
    }

    pub fn is_live(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Whether `id` currently has an armed frame request.
    pub fn frame_pending(&self, id: SessionId) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|session| session.frame.is_some())
    }

    pub fn listeners(&self, id: SessionId) -> Option<Listeners> {
        self.sessions.get(&id).map(|session| session.listeners)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// True when nothing can ever be delivered again without a new session.
    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty() && self.tasks.is_empty()
    }

    /// Whether a frame is armed or a task is queued.
    pub fn has_pending_work(&self) -> bool {
        !self.frames.is_empty() || !self.tasks.is_empty()
    }

    /// Sessions subscribed to `kind`, in subscription order.
    pub fn subscribers(&self, kind: ListenerKind) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|(_, session)| session.listeners.attached(kind))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Mark the start of a display refresh. Only requests armed before the returned boundary
    /// fire in this refresh; later ones wait for the next.
    pub fn frame_boundary(&self) -> FrameToken {
        FrameToken(self.next_token)
    }

    /// Disarm and return the oldest request armed before `boundary`.
    ///
    /// Requests not yet popped stay armed, so a refresh cut short keeps them for the next one.
    pub fn pop_frame_request(&mut self, boundary: FrameToken) -> Option<SessionId> {
        let (&token, _) = self.frames.first_key_value()?;
        if token >= boundary {
            return None;
        }
        let id = self.frames.remove(&token)?;
        if let Some(session) = self.sessions.get_mut(&id) {
            session.frame = None;
        }
        Some(id)
    }

    /// Number of tasks queued so far.
    pub fn queued_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Dequeue the oldest task.
    pub fn pop_task(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_frames(reg: &mut Registry) -> Vec<SessionId> {
        let boundary = reg.frame_boundary();
        std::iter::from_fn(|| reg.pop_frame_request(boundary)).collect()
    }

    fn drain_tasks(reg: &mut Registry) -> Vec<Task> {
        std::iter::from_fn(|| reg.pop_task()).collect()
    }

    #[test]
    fn ids_strictly_increase_across_shutdowns() {
        let mut reg = Registry::new();
        let mut ids = Vec::new();
        for i in 0..8 {
            let id = reg.open().unwrap();
            if i % 3 == 0 {
                assert!(reg.shutdown(id));
            }
            ids.push(id);
        }
        assert_eq!(ids.first(), Some(&1));
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {ids:?}");
    }

    #[test]
    fn exhausted_id_space_refuses_to_open() {
        let mut reg = Registry {
            counter: SessionId::MAX - 1,
            ..Registry::default()
        };
        assert_eq!(reg.open(), Some(SessionId::MAX));
        assert_eq!(reg.open(), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn open_subscribes_pointer_and_keyboard() {
        let mut reg = Registry::new();
        let id = reg.open().unwrap();
        assert_eq!(
            reg.listeners(id),
            Some(Listeners {
                pointer_move: true,
                keyboard: true
            })
        );
        assert_eq!(reg.subscribers(ListenerKind::PointerMove), vec![id]);
        assert_eq!(reg.subscribers(ListenerKind::Keyboard), vec![id]);
    }

    #[test]
    fn request_frame_on_unknown_id_is_false() {
        let mut reg = Registry::new();
        assert!(!reg.request_frame(42));
        assert!(fire_frames(&mut reg).is_empty());
    }

    #[test]
    fn repeated_requests_coalesce_into_one_frame() {
        let mut reg = Registry::new();
        let id = reg.open().unwrap();
        assert!(reg.request_frame(id));
        assert!(reg.request_frame(id));
        assert!(reg.frame_pending(id));
        assert!(reg.has_pending_work());
        assert_eq!(fire_frames(&mut reg), vec![id]);
        assert!(!reg.frame_pending(id));
        assert!(!reg.has_pending_work());
        assert!(fire_frames(&mut reg).is_empty());
    }

    #[test]
    fn frames_fire_in_request_order() {
        let mut reg = Registry::new();
        let a = reg.open().unwrap();
        let b = reg.open().unwrap();
        reg.request_frame(b);
        reg.request_frame(a);
        assert_eq!(fire_frames(&mut reg), vec![b, a]);
    }

    #[test]
    fn requests_after_the_boundary_wait_for_the_next_refresh() {
        let mut reg = Registry::new();
        let a = reg.open().unwrap();
        let b = reg.open().unwrap();
        reg.request_frame(a);

        let boundary = reg.frame_boundary();
        reg.request_frame(b);
        assert_eq!(reg.pop_frame_request(boundary), Some(a));
        assert!(reg.request_frame(a));
        assert_eq!(reg.pop_frame_request(boundary), None);

        assert_eq!(fire_frames(&mut reg), vec![b, a]);
    }

    #[test]
    fn unpopped_requests_stay_armed() {
        let mut reg = Registry::new();
        let a = reg.open().unwrap();
        let b = reg.open().unwrap();
        reg.request_frame(a);
        reg.request_frame(b);

        let boundary = reg.frame_boundary();
        assert_eq!(reg.pop_frame_request(boundary), Some(a));
        assert!(reg.frame_pending(b));
        assert!(reg.has_pending_work());
        assert_eq!(fire_frames(&mut reg), vec![b]);
    }

    #[test]
    fn shutdown_cancels_frame_and_detaches_listeners() {
        let mut reg = Registry::new();
        let a = reg.open().unwrap();
        let b = reg.open().unwrap();
        reg.request_frame(a);
        reg.request_frame(b);

        assert!(reg.shutdown(a));
        assert!(!reg.is_live(a));
        assert!(!reg.request_frame(a));
        assert_eq!(fire_frames(&mut reg), vec![b]);
        assert_eq!(reg.subscribers(ListenerKind::PointerMove), vec![b]);
        assert_eq!(reg.subscribers(ListenerKind::Keyboard), vec![b]);
    }

    #[test]
    fn shutdown_queues_exactly_one_destroyed_task() {
        let mut reg = Registry::new();
        let id = reg.open().unwrap();
        assert!(reg.shutdown(id));
        assert!(!reg.shutdown(id));
        assert!(!reg.is_idle());
        assert_eq!(drain_tasks(&mut reg), vec![Task::Destroyed(id)]);
        assert!(drain_tasks(&mut reg).is_empty());
        assert!(reg.is_idle());
    }

    #[test]
    fn shutdown_of_unknown_id_is_false() {
        let mut reg = Registry::new();
        assert!(!reg.shutdown(7));
        assert!(drain_tasks(&mut reg).is_empty());
    }
}
