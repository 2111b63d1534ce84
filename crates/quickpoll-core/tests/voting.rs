use async_trait::async_trait;
use quickpoll_core::config::PollSettings;
use quickpoll_core::dispatcher::CallbackEvent;
use quickpoll_core::poll::{DisplayedMessage, PollButton, PollId, PollRegistry, PollRenderer};
use quickpoll_core::{
    Command, EditOutcome, InboundEvent, PollTransport, TransportError, UpdateDispatcher,
};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Send {
        chat_id: i64,
        text: String,
        button: Option<PollButton>,
    },
    Edit {
        message_id: i32,
        text: String,
    },
    Ack {
        notice: Option<String>,
    },
}

/// Transport that records every outbound call and hands out sequential message ids.
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicI32,
}

impl RecordingTransport {
    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PollTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        button: Option<PollButton>,
    ) -> Result<i32, TransportError> {
        self.record(Call::Send {
            chat_id,
            text: text.to_string(),
            button,
        });
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 100)
    }

    async fn edit_message_text(
        &self,
        _chat_id: i64,
        message_id: i32,
        text: &str,
        _button: Option<PollButton>,
    ) -> Result<EditOutcome, TransportError> {
        self.record(Call::Edit {
            message_id,
            text: text.to_string(),
        });
        Ok(EditOutcome::Edited)
    }

    async fn acknowledge_interaction(
        &self,
        _interaction_id: &str,
        private_text: Option<String>,
    ) -> Result<(), TransportError> {
        self.record(Call::Ack {
            notice: private_text,
        });
        Ok(())
    }
}

const CHAT: i64 = -4242;

async fn publish(
    dispatcher: &UpdateDispatcher<Arc<RecordingTransport>>,
    transport: &RecordingTransport,
    question: &str,
    label: &str,
) -> (PollId, PollButton) {
    let steps = [
        InboundEvent::command(Command::NewPoll, CHAT, 1, "/newpoll"),
        InboundEvent::text(CHAT, 1, question),
        InboundEvent::text(CHAT, 1, label),
    ];
    for event in steps {
        dispatcher.dispatch(event).await.expect("dialog step");
    }

    let published = transport
        .calls()
        .into_iter()
        .rev()
        .find_map(|call| match call {
            Call::Send {
                button: Some(button),
                ..
            } => Some(button),
            _ => None,
        })
        .expect("poll message sent");
    let message_id = transport.next_message_id.load(Ordering::SeqCst) - 1 + 100;
    (PollId::new(CHAT, message_id), published)
}

fn press(poll: PollId, button: &PollButton, user_id: i64) -> InboundEvent {
    InboundEvent::Callback(CallbackEvent {
        interaction_id: format!("{user_id}"),
        chat_id: poll.chat_id,
        message_id: poll.message_id,
        user_id,
        user_name: format!("user{user_id}"),
        data: button.routing_id.clone(),
        displayed: DisplayedMessage::default(),
    })
}

#[tokio::test]
async fn pizza_poll_end_to_end() {
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = UpdateDispatcher::new(transport.clone(), &PollSettings::default());

    let (poll, button) = publish(&dispatcher, &transport, "Pizza tonight?", "Vote").await;
    assert_eq!(button.label, "Vote");
    assert!(transport.calls().contains(&Call::Send {
        chat_id: CHAT,
        text: "Pizza tonight?\n\n🗳 Votes: 0".to_string(),
        button: Some(button.clone()),
    }));

    dispatcher.dispatch(press(poll, &button, 42)).await.expect("vote");
    dispatcher.dispatch(press(poll, &button, 42)).await.expect("repeat vote");

    let calls = transport.calls();
    let edits: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, Call::Edit { .. }))
        .collect();
    assert_eq!(
        edits,
        vec![&Call::Edit {
            message_id: poll.message_id,
            text: "Pizza tonight?\n\n🗳 Votes: 1".to_string(),
        }]
    );
    assert_eq!(
        calls.last(),
        Some(&Call::Ack {
            notice: Some("You already voted.".to_string())
        })
    );

    let record = dispatcher.registry().snapshot(&poll).await.expect("poll registered");
    assert_eq!(record.tally(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_presses_are_all_counted() {
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = Arc::new(UpdateDispatcher::new(
        transport.clone(),
        &PollSettings::default(),
    ));
    let (poll, button) = publish(&dispatcher, &transport, "Friday drinks?", "I'm in").await;

    let handles: Vec<_> = (1..=64)
        .map(|user_id| {
            let dispatcher = dispatcher.clone();
            let event = press(poll, &button, user_id);
            tokio::spawn(async move { dispatcher.dispatch(event).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("vote");
    }

    let record = dispatcher.registry().snapshot(&poll).await.expect("poll registered");
    assert_eq!(record.tally(), 64);

    // Edits are issued under the poll lock, so the last one shows the final tally.
    let last_edit = transport
        .calls()
        .into_iter()
        .rev()
        .find_map(|call| match call {
            Call::Edit { text, .. } => Some(text),
            _ => None,
        });
    assert_eq!(last_edit.as_deref(), Some("Friday drinks?\n\n🗳 Votes: 64"));
}

#[tokio::test]
async fn separate_polls_keep_separate_tallies() {
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = UpdateDispatcher::new(transport.clone(), &PollSettings::default());

    let (first, first_button) = publish(&dispatcher, &transport, "First?", "Yes").await;
    let (second, second_button) = publish(&dispatcher, &transport, "Second?", "Yes").await;
    assert_ne!(first, second);
    assert_ne!(first_button.routing_id, second_button.routing_id);

    dispatcher.dispatch(press(first, &first_button, 9)).await.expect("vote");
    dispatcher.dispatch(press(second, &second_button, 9)).await.expect("vote");

    for poll in [first, second] {
        let record = dispatcher.registry().snapshot(&poll).await.expect("poll registered");
        assert_eq!(record.tally(), 1);
    }
}

/// Transport whose edits take a while, recording when each press was acknowledged.
struct SlowEditTransport {
    started: Instant,
    edit_delay: Duration,
    acks: Mutex<Vec<Duration>>,
}

#[async_trait]
impl PollTransport for SlowEditTransport {
    async fn send_message(
        &self,
        _chat_id: i64,
        _text: &str,
        _button: Option<PollButton>,
    ) -> Result<i32, TransportError> {
        Ok(1)
    }

    async fn edit_message_text(
        &self,
        _chat_id: i64,
        _message_id: i32,
        _text: &str,
        _button: Option<PollButton>,
    ) -> Result<EditOutcome, TransportError> {
        tokio::time::sleep(self.edit_delay).await;
        Ok(EditOutcome::Edited)
    }

    async fn acknowledge_interaction(
        &self,
        _interaction_id: &str,
        _private_text: Option<String>,
    ) -> Result<(), TransportError> {
        if let Ok(mut acks) = self.acks.lock() {
            acks.push(self.started.elapsed());
        }
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn acknowledgements_do_not_wait_for_slow_edits() {
    let edit_delay = Duration::from_millis(400);
    let transport = Arc::new(SlowEditTransport {
        started: Instant::now(),
        edit_delay,
        acks: Mutex::new(Vec::new()),
    });
    let dispatcher = Arc::new(UpdateDispatcher::new(
        transport.clone(),
        &PollSettings::default(),
    ));

    let poll = PollId::new(CHAT, 1);
    let record = PollRegistry::create_poll("Coffee?", "Yes");
    let rendered = PollRenderer::default().render(&record);
    let button = rendered.button.clone();
    dispatcher.registry().register(poll, record, rendered).await;

    let handles: Vec<_> = (1..=5)
        .map(|user_id| {
            let dispatcher = dispatcher.clone();
            let event = press(poll, &button, user_id);
            tokio::spawn(async move { dispatcher.dispatch(event).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("vote");
    }

    let acks = transport.acks.lock().map(|a| a.clone()).unwrap_or_default();
    assert_eq!(acks.len(), 5);
    for at in acks {
        assert!(at < edit_delay, "acknowledged after {at:?}");
    }
    let record = dispatcher.registry().snapshot(&poll).await.expect("poll registered");
    assert_eq!(record.tally(), 5);
}
