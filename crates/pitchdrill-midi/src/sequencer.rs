//! The single-worker playback executor.
//!
//! One dedicated thread owns the sink and runs a current-thread tokio
//! runtime; plans arrive over an unbounded channel and execute FIFO.
//! That single worker is what guarantees note-on before note-off per
//! note and keeps concurrent callers from interleaving sends to a sink
//! that is not assumed thread-safe.
//!
//! Scheduling is fire-and-forget: once a plan is queued it runs to
//! completion against the sink it was spawned with. Swapping devices
//! mid-note does not suppress the stale note-off; the old worker simply
//! drains on drop.

use std::collections::HashSet;
use std::thread;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::message::MidiCommand;
use crate::plan::PlaybackPlan;
use crate::sink::{MidiSink, PlaybackError};

/// Schedules timed note sends without blocking the caller.
pub struct PlaybackSequencer {
    tx: Option<mpsc::UnboundedSender<PlaybackPlan>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PlaybackSequencer {
    /// Starts the worker thread that owns `sink`.
    ///
    /// `on_error` is invoked on the worker for every failed send; the
    /// caller surfaces it to the user ("check your MIDI device") and
    /// leaves exercise state alone.
    pub fn spawn<S, F>(mut sink: S, mut on_error: F) -> std::io::Result<Self>
    where
        S: MidiSink + Send + 'static,
        F: FnMut(PlaybackError) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<PlaybackPlan>();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let worker = thread::Builder::new()
            .name("pitchdrill-playback".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(plan) = rx.recv().await {
                        execute_plan(&mut sink, plan, &mut on_error).await;
                    }
                });
            })?;
        Ok(PlaybackSequencer {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Queues a plan for execution and returns immediately.
    ///
    /// An empty plan (e.g. built from an empty note) is a silent no-op.
    /// Returns [`PlaybackError::WorkerGone`] if the worker has exited
    /// and the plan was dropped.
    pub fn play(&self, plan: PlaybackPlan) -> Result<(), PlaybackError> {
        if plan.is_empty() {
            return Ok(());
        }
        match &self.tx {
            Some(tx) if tx.send(plan).is_ok() => Ok(()),
            _ => Err(PlaybackError::WorkerGone),
        }
    }
}

impl Drop for PlaybackSequencer {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued plans, so
        // every sent note-on still gets its note-off.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Runs one plan against the sink, sleeping between offsets.
///
/// A failed note-on blacklists its note-off (nothing was turned on, so
/// nothing needs turning off); every failure is reported through
/// `on_error`.
async fn execute_plan<S, F>(sink: &mut S, plan: PlaybackPlan, on_error: &mut F)
where
    S: MidiSink,
    F: FnMut(PlaybackError),
{
    let start = Instant::now();
    let mut failed_ons: HashSet<u32> = HashSet::new();

    for event in plan.events {
        sleep_until(start + event.at).await;

        if event.msg.command == MidiCommand::NoteOff && failed_ons.contains(&event.note_id) {
            continue;
        }

        if let Err(err) = sink.send(&event.msg) {
            if event.msg.command == MidiCommand::NoteOn {
                failed_ons.insert(event.note_id);
            }
            log::warn!("dropping scheduled send for code {}: {}", event.msg.code, err);
            on_error(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use pitchdrill_core::pitch::{KeyboardNote, PitchClass};
    use pitchdrill_core::relative::RelativeSpec;
    use pitchdrill_core::rng::create_rng;

    use super::*;
    use crate::message::ShortMessage;
    use crate::plan::{plan_cue, plan_single, PlaybackParams};

    /// Records every send with its offset from worker start; optionally
    /// fails specific codes.
    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<(Duration, ShortMessage)>>>,
        fail_codes: Vec<u8>,
        started: Option<Instant>,
    }

    impl MidiSink for RecordingSink {
        fn send(&mut self, msg: &ShortMessage) -> Result<(), PlaybackError> {
            let started = *self.started.get_or_insert_with(Instant::now);
            if self.fail_codes.contains(&msg.code) {
                return Err(PlaybackError::Send("device closed".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((started.elapsed(), *msg));
            Ok(())
        }
    }

    fn short_params() -> PlaybackParams {
        PlaybackParams {
            note_duration: Duration::from_millis(100),
            ..PlaybackParams::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_before_off_with_duration_gap() {
        let mut sink = RecordingSink::default();
        let sent = sink.sent.clone();
        let note = KeyboardNote::from_parts(PitchClass::C, 3);
        let plan = plan_single(Some(note), &short_params());

        let mut errors = Vec::new();
        execute_plan(&mut sink, plan, &mut |e| errors.push(e)).await;

        let sent = sent.lock().unwrap();
        assert!(errors.is_empty());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, ShortMessage::note_on(4, note.code, 93));
        assert_eq!(sent[1].1, ShortMessage::note_off(4, note.code, 93));
        assert!(sent[1].0 - sent[0].0 >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_note_on_skips_its_note_off() {
        let ref_code = KeyboardNote::from_parts(PitchClass::C, 3).code;
        let cue = KeyboardNote::from_parts(PitchClass::G, 3);
        let mut sink = RecordingSink {
            fail_codes: vec![ref_code],
            ..RecordingSink::default()
        };
        let sent = sink.sent.clone();

        let spec = RelativeSpec {
            mode: pitchdrill_core::relative::RelativeMode::Ascending,
            reference_pitch: Some(PitchClass::C),
            reference_octave: None,
        };
        let mut rng = create_rng(3);
        let plan = plan_cue(cue, &spec, &short_params(), &mut rng);

        let mut errors = Vec::new();
        execute_plan(&mut sink, plan, &mut |e| errors.push(e)).await;

        // One failure reported for the reference's note-on; its note-off
        // never went out, the cue's pair did.
        assert_eq!(errors.len(), 1);
        let sent = sent.lock().unwrap();
        let codes: Vec<u8> = sent.iter().map(|(_, msg)| msg.code).collect();
        assert_eq!(codes, vec![cue.code, cue.code]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_mid_plan_leaves_other_notes_alone() {
        let first = KeyboardNote::from_parts(PitchClass::C, 3);
        let second = KeyboardNote::from_parts(PitchClass::E, 3);
        let plan = crate::plan::plan_sequence(
            &[
                (Duration::ZERO, Some(first)),
                (Duration::from_millis(100), Some(second)),
            ],
            &short_params(),
        );

        // Failing the second note leaves the first pair untouched.
        let mut sink = RecordingSink {
            fail_codes: vec![second.code],
            ..RecordingSink::default()
        };
        let sent = sink.sent.clone();

        let mut errors = Vec::new();
        execute_plan(&mut sink, plan, &mut |e| errors.push(e)).await;

        assert_eq!(errors.len(), 1); // note-on failed, note-off skipped
        let sent = sent.lock().unwrap();
        let codes: Vec<u8> = sent.iter().map(|(_, msg)| msg.code).collect();
        assert_eq!(codes, vec![first.code, first.code]);
    }

    #[test]
    fn test_spawned_worker_plays_and_drains_on_drop() {
        let sink = RecordingSink::default();
        let sent = sink.sent.clone();
        let note = KeyboardNote::from_parts(PitchClass::A, 2);
        let params = PlaybackParams {
            note_duration: Duration::from_millis(10),
            ..PlaybackParams::default()
        };

        let sequencer = PlaybackSequencer::spawn(sink, |_| {}).unwrap();
        sequencer.play(plan_single(Some(note), &params)).unwrap();
        // An empty plan is a no-op even without a live worker.
        sequencer.play(PlaybackPlan::default()).unwrap();
        drop(sequencer); // joins the worker, draining the queue

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1.code, note.code);
    }

    #[test]
    fn test_play_after_worker_exit_reports_worker_gone() {
        let mut sequencer = PlaybackSequencer::spawn(RecordingSink::default(), |_| {}).unwrap();
        sequencer.tx.take();
        if let Some(worker) = sequencer.worker.take() {
            worker.join().unwrap();
        }

        let note = KeyboardNote::from_parts(PitchClass::A, 2);
        let result = sequencer.play(plan_single(Some(note), &PlaybackParams::default()));
        assert!(matches!(result, Err(PlaybackError::WorkerGone)));
        assert!(sequencer.play(PlaybackPlan::default()).is_ok());
    }
}
