//! Client-side note list with optimistic reconciliation.
//!
//! Each remote mutation runs in two steps: `begin_*` applies the change to
//! the local list and hands out a [`Ticket`]; `complete_*` receives the
//! server's answer and either commits the authoritative record or rolls the
//! local list back to its pre-call snapshot.
//!
//! # Invariants
//! - At most one mutation per note is in flight.
//! - A failed call leaves the list exactly as it was before `begin_*`.
//! - Responses older than the newest completed ticket for the same entity
//!   are ignored.
//! - The local list keeps the store order: `updated_at DESC, id ASC`.

use crate::editor::NoteSink;
use crate::filter::{filter_notes, tags_of, NoteFilter};
use crate::model::note::{now_epoch_ms, NewNote, Note, NoteId, NotePatch, NoteValidationError};
use crate::sync::transport::{NoteTransport, TransportError};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handle for one in-flight remote operation.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    note_id: Option<NoteId>,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Target note; provisional id for creates, `None` for list refreshes.
    pub fn note_id(&self) -> Option<NoteId> {
        self.note_id
    }
}

/// Result of completing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    Committed(T),
    /// A newer response already won; nothing changed.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Validation(NoteValidationError),
    NotFound(NoteId),
    /// Another mutation for this note has not resolved yet.
    Pending(NoteId),
    /// The call failed; local state was rolled back.
    Transport(TransportError),
    /// The response lost to a newer one.
    Superseded,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Pending(id) => write!(f, "note {id} has a request in flight"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Superseded => write!(f, "response superseded by a newer request"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    /// Record before the optimistic change; `None` for creates.
    snapshot: Option<Note>,
}

/// In-memory view of the remote note store.
#[derive(Debug, Default)]
pub struct NotesSession {
    notes: Vec<Note>,
    next_seq: u64,
    in_flight: HashMap<NoteId, InFlight>,
    /// Confirmation stamp per note, kept only while an older refresh is
    /// outstanding.
    completed: HashMap<NoteId, u64>,
    /// Outstanding refresh tickets.
    refreshes: BTreeSet<u64>,
    refreshed_seq: u64,
}

impl NotesSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Notes passing `filter`, in list order.
    pub fn visible(&self, filter: &NoteFilter) -> Vec<&Note> {
        filter_notes(&self.notes, filter)
    }

    pub fn tags(&self) -> Vec<String> {
        tags_of(&self.notes)
    }

    /// Whether controls acting on `id` should be disabled.
    pub fn is_pending(&self, id: NoteId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty() || !self.refreshes.is_empty()
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        let seq = self.issue();
        self.refreshes.insert(seq);
        Ticket { seq, note_id: None }
    }

    /// Replaces the list with the server's, keeping local records that are
    /// in flight or were confirmed after this refresh was issued.
    pub fn complete_refresh(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Note>, TransportError>,
    ) -> Result<Applied<usize>, SessionError> {
        self.refreshes.remove(&ticket.seq);
        let applied = self.merge_refresh(&ticket, result);
        self.prune_completed();
        applied
    }

    fn merge_refresh(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<Note>, TransportError>,
    ) -> Result<Applied<usize>, SessionError> {
        if ticket.seq <= self.refreshed_seq {
            debug!("event=session_refresh module=sync status=stale seq={}", ticket.seq);
            return Ok(Applied::Stale);
        }
        let remote = result.map_err(|err| {
            warn!("event=session_refresh module=sync status=error error={err}");
            SessionError::Transport(err)
        })?;

        let local_wins = |id: &NoteId| {
            self.in_flight.contains_key(id)
                || self
                    .completed
                    .get(id)
                    .is_some_and(|&done| done > ticket.seq)
        };
        let mut merged: Vec<Note> = remote.into_iter().filter(|note| !local_wins(&note.id)).collect();
        merged.extend(self.notes.iter().filter(|note| local_wins(&note.id)).cloned());

        self.notes = merged;
        self.sort();
        self.refreshed_seq = ticket.seq;
        Ok(Applied::Committed(self.notes.len()))
    }

    /// Shows a provisional record until the server assigns the real one.
    pub fn begin_create(&mut self, new_note: NewNote) -> Result<Ticket, SessionError> {
        let note = Note::create(new_note, now_epoch_ms()).map_err(SessionError::Validation)?;
        let seq = self.issue();
        let provisional_id = note.id;
        self.in_flight.insert(
            provisional_id,
            InFlight {
                seq,
                snapshot: None,
            },
        );
        self.notes.push(note);
        self.sort();
        Ok(Ticket {
            seq,
            note_id: Some(provisional_id),
        })
    }

    pub fn complete_create(
        &mut self,
        ticket: Ticket,
        result: Result<Note, TransportError>,
    ) -> Result<Applied<Note>, SessionError> {
        let Some((provisional_id, _)) = self.take_in_flight(&ticket) else {
            return Ok(Applied::Stale);
        };
        self.notes.retain(|note| note.id != provisional_id);

        match result {
            Ok(note) => {
                self.mark_completed(note.id);
                self.upsert(note.clone());
                Ok(Applied::Committed(note))
            }
            Err(err) => {
                warn!("event=session_rollback module=sync op=create error={err}");
                Err(SessionError::Transport(err))
            }
        }
    }

    pub fn begin_update(&mut self, id: NoteId, patch: &NotePatch) -> Result<Ticket, SessionError> {
        self.ensure_idle(id)?;
        let index = self.position(id).ok_or(SessionError::NotFound(id))?;
        let next = self.notes[index]
            .patched(patch, now_epoch_ms())
            .map_err(SessionError::Validation)?;
        let snapshot = std::mem::replace(&mut self.notes[index], next);

        let seq = self.issue();
        self.in_flight.insert(
            id,
            InFlight {
                seq,
                snapshot: Some(snapshot),
            },
        );
        self.sort();
        Ok(Ticket {
            seq,
            note_id: Some(id),
        })
    }

    pub fn complete_update(
        &mut self,
        ticket: Ticket,
        result: Result<Note, TransportError>,
    ) -> Result<Applied<Note>, SessionError> {
        let Some((id, snapshot)) = self.take_in_flight(&ticket) else {
            return Ok(Applied::Stale);
        };

        match result {
            Ok(note) => {
                self.mark_completed(id);
                self.upsert(note.clone());
                Ok(Applied::Committed(note))
            }
            Err(err) => {
                warn!("event=session_rollback module=sync op=update note_id={id} error={err}");
                self.restore(id, snapshot);
                Err(SessionError::Transport(err))
            }
        }
    }

    pub fn begin_remove(&mut self, id: NoteId) -> Result<Ticket, SessionError> {
        self.ensure_idle(id)?;
        let index = self.position(id).ok_or(SessionError::NotFound(id))?;
        let snapshot = self.notes.remove(index);

        let seq = self.issue();
        self.in_flight.insert(
            id,
            InFlight {
                seq,
                snapshot: Some(snapshot),
            },
        );
        Ok(Ticket {
            seq,
            note_id: Some(id),
        })
    }

    pub fn complete_remove(
        &mut self,
        ticket: Ticket,
        result: Result<(), TransportError>,
    ) -> Result<Applied<()>, SessionError> {
        let Some((id, snapshot)) = self.take_in_flight(&ticket) else {
            return Ok(Applied::Stale);
        };

        match result {
            Ok(()) => {
                self.mark_completed(id);
                Ok(Applied::Committed(()))
            }
            Err(err) => {
                warn!("event=session_rollback module=sync op=remove note_id={id} error={err}");
                self.restore(id, snapshot);
                Err(SessionError::Transport(err))
            }
        }
    }

    /// Blocking refresh through `transport`.
    pub fn refresh<T: NoteTransport + ?Sized>(
        &mut self,
        transport: &T,
    ) -> Result<&[Note], SessionError> {
        let ticket = self.begin_refresh();
        let result = transport.list();
        self.complete_refresh(ticket, result)?;
        Ok(&self.notes)
    }

    /// Blocking create through `transport`.
    pub fn add<T: NoteTransport + ?Sized>(
        &mut self,
        transport: &T,
        new_note: NewNote,
    ) -> Result<Note, SessionError> {
        let ticket = self.begin_create(new_note.clone())?;
        let result = transport.create(&new_note);
        committed(self.complete_create(ticket, result)?)
    }

    /// Blocking update through `transport`.
    pub fn update<T: NoteTransport + ?Sized>(
        &mut self,
        transport: &T,
        id: NoteId,
        patch: NotePatch,
    ) -> Result<Note, SessionError> {
        let ticket = self.begin_update(id, &patch)?;
        let result = transport.update(id, &patch);
        committed(self.complete_update(ticket, result)?)
    }

    /// Blocking delete through `transport`.
    pub fn remove<T: NoteTransport + ?Sized>(
        &mut self,
        transport: &T,
        id: NoteId,
    ) -> Result<(), SessionError> {
        let ticket = self.begin_remove(id)?;
        let result = transport.delete(id);
        committed(self.complete_remove(ticket, result)?)
    }

    fn issue(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Stamps a confirmed mutation so that refreshes issued before the
    /// confirmation cannot revert it. Without such a refresh nothing is kept.
    fn mark_completed(&mut self, id: NoteId) {
        let stamp = self.issue();
        if self.refreshes.first().is_some_and(|&oldest| oldest < stamp) {
            self.completed.insert(id, stamp);
        } else {
            self.completed.remove(&id);
        }
    }

    /// Drops stamps that no outstanding refresh predates.
    fn prune_completed(&mut self) {
        match self.refreshes.first().copied() {
            Some(oldest) => self.completed.retain(|_, stamp| *stamp > oldest),
            None => self.completed.clear(),
        }
    }

    fn ensure_idle(&self, id: NoteId) -> Result<(), SessionError> {
        if self.is_pending(id) {
            return Err(SessionError::Pending(id));
        }
        Ok(())
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn take_in_flight(&mut self, ticket: &Ticket) -> Option<(NoteId, Option<Note>)> {
        let id = ticket.note_id?;
        match self.in_flight.get(&id) {
            Some(flight) if flight.seq == ticket.seq => {}
            _ => {
                debug!("event=session_complete module=sync status=stale seq={}", ticket.seq);
                return None;
            }
        }
        self.in_flight.remove(&id).map(|flight| (id, flight.snapshot))
    }

    fn restore(&mut self, id: NoteId, snapshot: Option<Note>) {
        self.notes.retain(|note| note.id != id);
        if let Some(note) = snapshot {
            self.notes.push(note);
        }
        self.sort();
    }

    fn upsert(&mut self, note: Note) {
        match self.position(note.id) {
            Some(index) => self.notes[index] = note,
            None => self.notes.push(note),
        }
        self.sort();
    }

    fn sort(&mut self) {
        self.notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

fn committed<T>(applied: Applied<T>) -> Result<T, SessionError> {
    match applied {
        Applied::Committed(value) => Ok(value),
        Applied::Stale => Err(SessionError::Superseded),
    }
}

/// Editor sink that routes submissions through a session and transport.
pub struct RemoteSink<'a, T: NoteTransport + ?Sized> {
    session: &'a mut NotesSession,
    transport: &'a T,
}

impl<'a, T: NoteTransport + ?Sized> RemoteSink<'a, T> {
    pub fn new(session: &'a mut NotesSession, transport: &'a T) -> Self {
        Self { session, transport }
    }
}

impl<T: NoteTransport + ?Sized> NoteSink for RemoteSink<'_, T> {
    type Error = SessionError;

    fn add_note(&mut self, new_note: NewNote) -> Result<Note, SessionError> {
        self.session.add(self.transport, new_note)
    }

    fn update_note(&mut self, id: NoteId, patch: NotePatch) -> Result<Note, SessionError> {
        self.session.update(self.transport, id, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::{Applied, NotesSession, RemoteSink, SessionError};
    use crate::editor::NoteEditor;
    use crate::model::note::{NewNote, Note, NoteId, NotePatch};
    use crate::sync::transport::{ApiErrorKind, NoteTransport, TransportError};
    use std::cell::{Cell, RefCell};

    /// Transport backed by a plain vector with a switchable outage.
    #[derive(Default)]
    struct FakeTransport {
        notes: RefCell<Vec<Note>>,
        offline: Cell<bool>,
        clock: Cell<i64>,
    }

    impl FakeTransport {
        fn tick(&self) -> i64 {
            self.clock.set(self.clock.get() + 1_000);
            self.clock.get()
        }

        fn check(&self) -> Result<(), TransportError> {
            if self.offline.get() {
                return Err(TransportError::Network("connection refused".to_string()));
            }
            Ok(())
        }
    }

    impl NoteTransport for FakeTransport {
        fn list(&self) -> Result<Vec<Note>, TransportError> {
            self.check()?;
            Ok(self.notes.borrow().clone())
        }

        fn create(&self, new_note: &NewNote) -> Result<Note, TransportError> {
            self.check()?;
            let note = Note::create(new_note.clone(), self.tick()).map_err(|err| {
                TransportError::Rejected {
                    status: 400,
                    kind: ApiErrorKind::ValidationError,
                    message: err.to_string(),
                }
            })?;
            self.notes.borrow_mut().push(note.clone());
            Ok(note)
        }

        fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, TransportError> {
            self.check()?;
            let mut notes = self.notes.borrow_mut();
            let slot = notes
                .iter_mut()
                .find(|note| note.id == id)
                .ok_or_else(|| TransportError::Rejected {
                    status: 404,
                    kind: ApiErrorKind::NotFound,
                    message: "missing".to_string(),
                })?;
            *slot = slot.patched(patch, self.tick()).expect("valid patch");
            Ok(slot.clone())
        }

        fn delete(&self, id: NoteId) -> Result<(), TransportError> {
            self.check()?;
            self.notes.borrow_mut().retain(|note| note.id != id);
            Ok(())
        }
    }

    fn seeded() -> (NotesSession, FakeTransport) {
        let transport = FakeTransport::default();
        let mut session = NotesSession::new();
        session.add(&transport, NewNote::new("first", "one")).unwrap();
        session
            .add(&transport, NewNote::new("second", "two").with_tags(["home"]))
            .unwrap();
        (session, transport)
    }

    #[test]
    fn add_replaces_provisional_record_with_server_record() {
        let (session, transport) = seeded();
        let server_ids: Vec<_> = transport.notes.borrow().iter().map(|n| n.id).collect();
        assert_eq!(session.notes().len(), 2);
        for note in session.notes() {
            assert!(server_ids.contains(&note.id));
        }
        assert_eq!(session.notes()[0].title, "second");
        assert!(!session.has_pending());
    }

    #[test]
    fn failed_update_rolls_back_to_previous_list() {
        let (mut session, transport) = seeded();
        let before = session.notes().to_vec();
        let target = before[1].id;

        transport.offline.set(true);
        let err = session
            .update(&transport, target, NotePatch::title("renamed"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Transport(TransportError::Network(_))));
        assert_eq!(session.notes(), &before[..]);
        assert!(!session.is_pending(target));
    }

    #[test]
    fn failed_create_and_remove_leave_list_unchanged() {
        let (mut session, transport) = seeded();
        let before = session.notes().to_vec();
        transport.offline.set(true);

        assert!(session.add(&transport, NewNote::new("x", "")).is_err());
        assert!(session.remove(&transport, before[0].id).is_err());
        assert_eq!(session.notes(), &before[..]);
    }

    #[test]
    fn optimistic_update_is_visible_while_pending() {
        let (mut session, transport) = seeded();
        let target = session.notes()[1].id;

        let ticket = session.begin_update(target, &NotePatch::title("draft")).unwrap();
        assert_eq!(session.get(target).unwrap().title, "draft");
        assert!(session.is_pending(target));
        assert!(matches!(
            session.begin_remove(target),
            Err(SessionError::Pending(id)) if id == target
        ));

        let confirmed = transport.update(target, &NotePatch::title("draft"));
        let applied = session.complete_update(ticket, confirmed).unwrap();
        assert!(matches!(applied, Applied::Committed(ref note) if note.title == "draft"));
        assert!(!session.is_pending(target));
    }

    #[test]
    fn local_validation_rejects_empty_note_before_network() {
        let mut session = NotesSession::new();
        let transport = FakeTransport::default();
        transport.offline.set(true);

        let err = session.add(&transport, NewNote::new(" ", "")).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert!(session.notes().is_empty());
    }

    #[test]
    fn older_refresh_response_is_ignored() {
        let (mut session, transport) = seeded();
        let older = session.begin_refresh();
        let newer = session.begin_refresh();

        let fresh = transport.list();
        assert!(matches!(
            session.complete_refresh(newer, fresh),
            Ok(Applied::Committed(2))
        ));
        assert_eq!(
            session.complete_refresh(older, Ok(Vec::new())).unwrap(),
            Applied::Stale
        );
        assert_eq!(session.notes().len(), 2);
    }

    #[test]
    fn refresh_issued_before_update_does_not_revert_it() {
        let (mut session, transport) = seeded();
        let target = session.notes()[0].id;
        let refresh = session.begin_refresh();
        let stale_list = transport.list();

        session
            .update(&transport, target, NotePatch::title("newer"))
            .unwrap();
        session.complete_refresh(refresh, stale_list).unwrap();

        assert_eq!(session.get(target).unwrap().title, "newer");
    }

    #[test]
    fn refresh_issued_while_update_in_flight_does_not_revert_it() {
        let (mut session, transport) = seeded();
        let target = session.notes()[0].id;
        let update = session.begin_update(target, &NotePatch::title("newer")).unwrap();
        let refresh = session.begin_refresh();
        let stale_list = transport.list();

        let confirmed = transport.update(target, &NotePatch::title("newer"));
        session.complete_update(update, confirmed).unwrap();
        session.complete_refresh(refresh, stale_list).unwrap();

        assert_eq!(session.get(target).unwrap().title, "newer");
    }

    #[test]
    fn confirmation_stamps_are_dropped_once_no_refresh_is_outstanding() {
        let (mut session, transport) = seeded();
        assert!(session.completed.is_empty());

        let refresh = session.begin_refresh();
        let target = session.notes()[0].id;
        session.remove(&transport, target).unwrap();
        assert_eq!(session.completed.len(), 1);

        let listed = transport.list();
        session.complete_refresh(refresh, listed).unwrap();
        assert!(session.completed.is_empty());
        assert!(session.get(target).is_none());

        let other = session.notes()[0].id;
        session.remove(&transport, other).unwrap();
        assert!(session.completed.is_empty());
        assert!(!session.has_pending());
    }

    #[test]
    fn failed_refresh_still_releases_its_ticket() {
        let (mut session, transport) = seeded();
        let refresh = session.begin_refresh();
        assert!(session.has_pending());

        transport.offline.set(true);
        let listed = transport.list();
        assert!(session.complete_refresh(refresh, listed).is_err());
        assert!(!session.has_pending());
        assert_eq!(session.notes().len(), 2);
    }

    #[test]
    fn refresh_keeps_in_flight_provisional_notes() {
        let (mut session, transport) = seeded();
        let ticket = session.begin_create(NewNote::new("pending", "")).unwrap();
        let provisional = ticket.note_id().unwrap();

        session.refresh(&transport).unwrap();
        assert!(session.get(provisional).is_some());

        let created = transport.create(&NewNote::new("pending", ""));
        session.complete_create(ticket, created).unwrap();
        assert!(session.get(provisional).is_none());
        assert_eq!(session.notes().len(), 3);
    }

    #[test]
    fn visible_and_tags_derive_from_local_list() {
        let (session, _transport) = seeded();
        let filter = crate::filter::NoteFilter::new("", Some("home".to_string()));
        let visible = session.visible(&filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "second");
        assert_eq!(session.tags(), vec!["home"]);
    }

    #[test]
    fn editor_submits_through_remote_sink() {
        let (mut session, transport) = seeded();
        let mut editor = NoteEditor::create();
        editor.set_title("Shopping");
        editor.set_tags_input("home");

        let outcome = editor
            .submit(&mut RemoteSink::new(&mut session, &transport))
            .unwrap();
        assert_eq!(session.get(outcome.note().id).unwrap().title, "Shopping");
        assert_eq!(transport.notes.borrow().len(), 3);
    }
}
