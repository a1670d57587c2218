use std::sync::Arc;

use mailcamp_domain::id::{ClientId, MailingId, UserId};
use mailcamp_domain::mailing::{MailingStatus, ScheduleError};
use mailcamp_domain::pagination::PageRequest;
use mailcamp_mailings::domain::types::{DispatchMode, Scope};
use mailcamp_mailings::error::MailingsServiceError;
use mailcamp_mailings::usecase::attempt::{ListAttemptsUseCase, ListMailingAttemptsUseCase};
use mailcamp_mailings::usecase::dispatch::DispatchMailingUseCase;
use mailcamp_mailings::usecase::mailing::{
    CreateMailingInput, CreateMailingUseCase, DeleteMailingUseCase, GetMailingUseCase,
    ListMailingsUseCase, UpdateMailingInput, UpdateMailingUseCase,
};

use crate::helpers::{
    FixedClock, MemoryClientRepo, MemoryMailingRepo, MemoryMessageRepo, MemoryStore,
    RecordingTransport, at,
};

type Create = CreateMailingUseCase<MemoryMailingRepo, MemoryMessageRepo, MemoryClientRepo, Arc<FixedClock>>;
type Update = UpdateMailingUseCase<MemoryMailingRepo, MemoryMessageRepo, MemoryClientRepo, Arc<FixedClock>>;

fn create_usecase(store: &MemoryStore, owner: UserId, clock: Arc<FixedClock>) -> Create {
    CreateMailingUseCase {
        mailings: store.mailings_in(Scope::Owner(owner)),
        messages: store.messages_for(owner),
        clients: store.clients_for(owner),
        clock,
    }
}

fn update_usecase(store: &MemoryStore, owner: UserId, clock: Arc<FixedClock>) -> Update {
    UpdateMailingUseCase {
        mailings: store.mailings_in(Scope::Owner(owner)),
        messages: store.messages_for(owner),
        clients: store.clients_for(owner),
        clock,
    }
}

// ── CreateMailing ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_mailing_in_created_status() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let a = store.client(owner, "a@example.com");
    let message = store.message(owner, "Launch");

    let mailing = create_usecase(&store, owner, FixedClock::at(at(9, 0)))
        .execute(
            owner,
            CreateMailingInput {
                message_id: message.id,
                recipient_ids: vec![a.id, a.id],
                start_time: at(10, 0),
                end_time: at(12, 0),
            },
        )
        .await
        .unwrap();

    assert_eq!(mailing.status, MailingStatus::Created);
    assert_eq!(mailing.owner_id, owner);
    assert_eq!(mailing.recipient_ids, vec![a.id]);
    assert_eq!(store.stored_mailing(mailing.id).unwrap(), mailing);
}

#[tokio::test]
async fn should_create_mailing_already_started_when_window_begins_now() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");

    let mailing = create_usecase(&store, owner, FixedClock::at(at(10, 0)))
        .execute(
            owner,
            CreateMailingInput {
                message_id: message.id,
                recipient_ids: vec![],
                start_time: at(10, 0),
                end_time: at(12, 0),
            },
        )
        .await
        .unwrap();

    assert_eq!(mailing.status, MailingStatus::Started);
}

#[tokio::test]
async fn should_reject_past_start_on_create() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");

    let result = create_usecase(&store, owner, FixedClock::at(at(11, 0)))
        .execute(
            owner,
            CreateMailingInput {
                message_id: message.id,
                recipient_ids: vec![],
                start_time: at(10, 0),
                end_time: at(12, 0),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(MailingsServiceError::InvalidSchedule(ScheduleError::PastStart))
    ));
}

#[tokio::test]
async fn should_reject_start_not_before_end_on_create() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");

    let result = create_usecase(&store, owner, FixedClock::at(at(9, 0)))
        .execute(
            owner,
            CreateMailingInput {
                message_id: message.id,
                recipient_ids: vec![],
                start_time: at(12, 0),
                end_time: at(12, 0),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(MailingsServiceError::InvalidSchedule(ScheduleError::Ordering))
    ));
}

#[tokio::test]
async fn should_refuse_message_or_clients_of_another_owner() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let stranger = UserId::generate();
    let own_message = store.message(owner, "Mine");
    let foreign_message = store.message(stranger, "Theirs");
    let foreign_client = store.client(stranger, "x@example.com");
    let usecase = create_usecase(&store, owner, FixedClock::at(at(9, 0)));

    let result = usecase
        .execute(
            owner,
            CreateMailingInput {
                message_id: foreign_message.id,
                recipient_ids: vec![],
                start_time: at(10, 0),
                end_time: at(12, 0),
            },
        )
        .await;
    assert!(matches!(result, Err(MailingsServiceError::MessageNotFound)));

    let result = usecase
        .execute(
            owner,
            CreateMailingInput {
                message_id: own_message.id,
                recipient_ids: vec![foreign_client.id, ClientId::generate()],
                start_time: at(10, 0),
                end_time: at(12, 0),
            },
        )
        .await;
    assert!(matches!(result, Err(MailingsServiceError::ClientNotFound)));
}

// ── Get / List ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refresh_status_on_read() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");
    let mailing = store.mailing(&message, &[], at(10, 0), at(12, 0), MailingStatus::Created);
    let clock = FixedClock::at(at(11, 0));

    let get = GetMailingUseCase {
        mailings: store.mailings_in(Scope::Owner(owner)),
        clock: clock.clone(),
    };
    assert_eq!(get.execute(mailing.id).await.unwrap().status, MailingStatus::Started);

    clock.set(at(13, 0));
    let list = ListMailingsUseCase {
        mailings: store.mailings_in(Scope::Owner(owner)),
        clock,
    };
    let listed = list.execute(PageRequest::default()).await.unwrap();
    assert_eq!(listed[0].status, MailingStatus::Completed);
    assert_eq!(
        store.status_writes(),
        vec![
            (mailing.id, MailingStatus::Started),
            (mailing.id, MailingStatus::Completed)
        ]
    );
}

#[tokio::test]
async fn should_hide_other_owners_mailings() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let stranger = UserId::generate();
    let message = store.message(owner, "Launch");
    let mailing = store.mailing(&message, &[], at(10, 0), at(12, 0), MailingStatus::Created);

    let get = GetMailingUseCase {
        mailings: store.mailings_in(Scope::Owner(stranger)),
        clock: FixedClock::at(at(9, 0)),
    };
    assert!(matches!(
        get.execute(mailing.id).await,
        Err(MailingsServiceError::MailingNotFound)
    ));

    let list = ListMailingsUseCase {
        mailings: store.mailings_in(Scope::Owner(stranger)),
        clock: FixedClock::at(at(9, 0)),
    };
    assert!(list.execute(PageRequest::default()).await.unwrap().is_empty());

    let delete = DeleteMailingUseCase {
        mailings: store.mailings_in(Scope::Owner(stranger)),
    };
    assert!(matches!(
        delete.execute(mailing.id).await,
        Err(MailingsServiceError::MailingNotFound)
    ));
    assert!(store.stored_mailing(mailing.id).is_some());
}

// ── UpdateMailing ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_past_start_when_dates_unchanged() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let a = store.client(owner, "a@example.com");
    let b = store.client(owner, "b@example.com");
    let message = store.message(owner, "Launch");
    let mailing = store.mailing(&message, &[&a], at(10, 0), at(12, 0), MailingStatus::Started);

    let updated = update_usecase(&store, owner, FixedClock::at(at(11, 0)))
        .execute(
            mailing.id,
            UpdateMailingInput {
                recipient_ids: Some(vec![b.id, a.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(updated.recipient_ids, expected);
    assert_eq!(updated.start_time, at(10, 0));
    assert_eq!(updated.status, MailingStatus::Started);
}

#[tokio::test]
async fn should_allow_extending_window_of_running_mailing() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");
    let mailing = store.mailing(&message, &[], at(10, 0), at(12, 0), MailingStatus::Started);

    let updated = update_usecase(&store, owner, FixedClock::at(at(13, 0)))
        .execute(
            mailing.id,
            UpdateMailingInput {
                end_time: Some(at(14, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.end_time, at(14, 0));
    assert_eq!(updated.status, MailingStatus::Started);
}

#[tokio::test]
async fn should_reject_inverted_window_on_update() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let message = store.message(owner, "Launch");
    let mailing = store.mailing(&message, &[], at(10, 0), at(12, 0), MailingStatus::Created);

    let result = update_usecase(&store, owner, FixedClock::at(at(9, 0)))
        .execute(
            mailing.id,
            UpdateMailingInput {
                end_time: Some(at(9, 30)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(MailingsServiceError::InvalidSchedule(ScheduleError::Ordering))
    ));
    assert_eq!(store.stored_mailing(mailing.id).unwrap().end_time, at(12, 0));
}

#[tokio::test]
async fn should_return_missing_data_for_empty_mailing_patch() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let result = update_usecase(&store, owner, FixedClock::at(at(9, 0)))
        .execute(MailingId::generate(), UpdateMailingInput::default())
        .await;
    assert!(matches!(result, Err(MailingsServiceError::MissingData)));
}

// ── Attempts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_attempts_of_own_mailings_only() {
    let store = MemoryStore::default();
    let owner = UserId::generate();
    let stranger = UserId::generate();
    let a = store.client(owner, "a@example.com");
    let x = store.client(stranger, "x@example.com");
    let own = store.mailing(
        &store.message(owner, "Mine"),
        &[&a],
        at(10, 0),
        at(12, 0),
        MailingStatus::Started,
    );
    let foreign = store.mailing(
        &store.message(stranger, "Theirs"),
        &[&x],
        at(10, 0),
        at(12, 0),
        MailingStatus::Started,
    );

    for (user, id) in [(owner, own.id), (stranger, foreign.id)] {
        let dispatch = DispatchMailingUseCase {
            mailings: store.mailings_in(Scope::Owner(user)),
            attempts: store.attempts_in(Scope::Owner(user)),
            transport: RecordingTransport::default(),
            clock: FixedClock::at(at(11, 0)),
        };
        dispatch.execute_by_id(id, DispatchMode::Normal).await.unwrap();
    }

    let all = ListAttemptsUseCase {
        attempts: store.attempts_in(Scope::Owner(owner)),
    }
    .execute(PageRequest::default())
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].mailing_id, own.id);

    let per_mailing = ListMailingAttemptsUseCase {
        mailings: store.mailings_in(Scope::Owner(owner)),
        attempts: store.attempts_in(Scope::Owner(owner)),
    };
    assert_eq!(
        per_mailing
            .execute(own.id, PageRequest::default())
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        per_mailing.execute(foreign.id, PageRequest::default()).await,
        Err(MailingsServiceError::MailingNotFound)
    ));
}
