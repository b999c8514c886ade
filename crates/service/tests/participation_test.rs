use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use meetsync_core::errors::MeetError;
use meetsync_core::models::appointment::{CreateAppointmentRequest, Location};
use meetsync_core::models::attendee::AttendeeStatus;
use meetsync_core::models::user::CurrentUser;
use meetsync_core::participation::Participation;
use meetsync_service::participation::ParticipationService;
use meetsync_store::adapters::{AppointmentStore, AttendeeStore};
use meetsync_store::memory::MemoryStore;
use meetsync_store::{Entity, RecordStore};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::time::timeout;
use uuid::Uuid;

fn setup() -> (Arc<MemoryStore>, ParticipationService, AttendeeStore) {
    let store = Arc::new(MemoryStore::new());
    let service = ParticipationService::new(store.clone());
    let attendees = AttendeeStore::new(store.clone());
    (store, service, attendees)
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn create_request(invitees: Vec<Uuid>) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        title: "Planning".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        start_time: Some(hm(9, 0)),
        end_time: None,
        kind: "meeting".to_string(),
        description: String::new(),
        location: Location::Text {
            location_text: "Room 1".to_string(),
        },
        organizer_only: false,
        invitees,
    }
}

#[tokio::test]
async fn test_create_appointment_invites_and_derives_end_time() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let invitee = Uuid::new_v4();

    // The invitee list carries a duplicate and the organizer; both collapse.
    let appointment = service
        .create_appointment(
            &organizer,
            create_request(vec![invitee, invitee, organizer.id]),
        )
        .await
        .unwrap();

    assert_eq!(appointment.end_time, hm(10, 0));
    assert_eq!(appointment.created_by, organizer.id);

    let records = attendees
        .find_for_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, invitee);
    assert_eq!(records[0].status, AttendeeStatus::Pending);
}

#[tokio::test]
async fn test_create_appointment_wraps_the_derived_end_time_past_midnight() {
    let (_store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let mut request = create_request(vec![]);
    request.start_time = Some(hm(23, 30));

    let appointment = service
        .create_appointment(&organizer, request)
        .await
        .unwrap();
    assert_eq!(appointment.end_time, hm(0, 30));
}

#[tokio::test]
async fn test_create_appointment_validation() {
    let (_store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());

    let mut request = create_request(vec![]);
    request.start_time = None;
    let err = service
        .create_appointment(&organizer, request)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::Validation(_)));
    assert!(err.to_string().contains("end time required"));

    let mut request = create_request(vec![]);
    request.title = "  ".to_string();
    let err = service
        .create_appointment(&organizer, request)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::Validation(_)));
}

#[tokio::test]
async fn test_request_then_approve() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    let record = service
        .request_to_join(&user, appointment.id)
        .await
        .unwrap();
    assert_eq!(record.status, AttendeeStatus::Requested);
    assert_eq!(
        service
            .participation(appointment.id, user.id)
            .await
            .unwrap(),
        Participation::Requested
    );

    tokio_test::assert_ok!(service.approve_request(&organizer, record.id).await);

    let record = attendees.get(record.id).await.unwrap().unwrap();
    assert_eq!(record.status, AttendeeStatus::Accepted);
    assert_eq!(
        service
            .participation(appointment.id, user.id)
            .await
            .unwrap(),
        Participation::Member
    );
}

#[tokio::test]
async fn test_second_request_is_a_duplicate() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    service
        .request_to_join(&user, appointment.id)
        .await
        .unwrap();
    let err = service
        .request_to_join(&user, appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::DuplicateParticipation(_)));

    // Still exactly one record for the pair.
    let records = attendees
        .find_for_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_restricted_appointment_rejects_requests() {
    let (_store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let mut request = create_request(vec![]);
    request.organizer_only = true;
    let appointment = service
        .create_appointment(&organizer, request)
        .await
        .unwrap();

    let err = service
        .request_to_join(&user, appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));
}

#[tokio::test]
async fn test_reinvite_after_decline_reinstates_the_record() {
    let (_store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    let record = service
        .invite(&organizer, appointment.id, user.id)
        .await
        .unwrap();
    service.decline_invitation(&user, record.id).await.unwrap();

    let reinstated = service
        .invite(&organizer, appointment.id, user.id)
        .await
        .unwrap();
    assert_eq!(reinstated.id, record.id);
    assert_eq!(reinstated.status, AttendeeStatus::Pending);
}

#[rstest]
#[case(AttendeeStatus::Accepted)]
#[case(AttendeeStatus::Declined)]
#[tokio::test]
async fn test_reapplying_a_resolution_is_a_noop(#[case] resolution: AttendeeStatus) {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![user.id]))
        .await
        .unwrap();
    let record = attendees
        .find_record(appointment.id, user.id)
        .await
        .unwrap()
        .unwrap();

    // The second round is the duplicate answer a racing client would
    // produce; it must apply as a no-op.
    for _ in 0..2 {
        match resolution {
            AttendeeStatus::Declined => service
                .decline_invitation(&user, record.id)
                .await
                .unwrap(),
            _ => service.accept_invitation(&user, record.id).await.unwrap(),
        }
    }

    let stored = attendees.get(record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, resolution);
}

#[tokio::test]
async fn test_unauthorized_actions_leave_the_store_untouched() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let outsider = CurrentUser::new(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![user.id]))
        .await
        .unwrap();
    let record = attendees
        .find_record(appointment.id, user.id)
        .await
        .unwrap()
        .unwrap();

    let err = service
        .invite(&outsider, appointment.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    let err = service
        .accept_invitation(&outsider, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    // One pending record, exactly as before.
    let records = attendees
        .find_for_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendeeStatus::Pending);
}

#[tokio::test]
async fn test_set_attendees_reconciles_and_preserves_status() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let kept = CurrentUser::new(Uuid::new_v4());
    let removed = Uuid::new_v4();
    let added = Uuid::new_v4();
    let appointment = service
        .create_appointment(&organizer, create_request(vec![kept.id, removed]))
        .await
        .unwrap();
    let kept_record = attendees
        .find_record(appointment.id, kept.id)
        .await
        .unwrap()
        .unwrap();
    service
        .accept_invitation(&kept, kept_record.id)
        .await
        .unwrap();

    service
        .set_attendees(&organizer, appointment.id, &[kept.id, added])
        .await
        .unwrap();

    let records = attendees
        .find_for_appointment(appointment.id)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    let kept_after = records.iter().find(|r| r.user_id == kept.id).unwrap();
    // The accepted record survived the edit untouched.
    assert_eq!(kept_after.id, kept_record.id);
    assert_eq!(kept_after.status, AttendeeStatus::Accepted);
    let added_after = records.iter().find(|r| r.user_id == added).unwrap();
    assert_eq!(added_after.status, AttendeeStatus::Pending);
    assert!(!records.iter().any(|r| r.user_id == removed));
}

#[tokio::test]
async fn test_set_attendees_is_idempotent() {
    let (store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    service
        .set_attendees(&organizer, appointment.id, &[u1, u2])
        .await
        .unwrap();
    assert_eq!(
        attendees
            .find_for_appointment(appointment.id)
            .await
            .unwrap()
            .len(),
        2
    );

    // The second submission of the same selection plans zero writes, so the
    // change feed stays silent.
    let mut feed = store.subscribe(Entity::Attendee, None);
    service
        .set_attendees(&organizer, appointment.id, &[u1, u2])
        .await
        .unwrap();
    let outcome = timeout(Duration::from_millis(200), feed.next()).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_delete_appointment_cascades_to_attendees() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let user = Uuid::new_v4();
    let appointment = service
        .create_appointment(&organizer, create_request(vec![user]))
        .await
        .unwrap();

    let err = service
        .delete_appointment(&CurrentUser::new(user), appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    service
        .delete_appointment(&organizer, appointment.id)
        .await
        .unwrap();

    assert!(
        attendees
            .find_for_appointment(appointment.id)
            .await
            .unwrap()
            .is_empty()
    );
    let err = service
        .delete_appointment(&organizer, appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::NotFound(_)));
}

#[tokio::test]
async fn test_admin_carries_organizer_authority() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let admin = CurrentUser::admin(Uuid::new_v4());
    let user = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    service
        .invite(&admin, appointment.id, user.id)
        .await
        .unwrap();
    let record = attendees
        .find_record(appointment.id, user.id)
        .await
        .unwrap()
        .unwrap();
    // The target-user side is not the admin's to act on.
    let err = service
        .accept_invitation(&admin, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    service
        .delete_appointment(&admin, appointment.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_withdraw_by_creator_only() {
    let (_store, service, attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let invited = CurrentUser::new(Uuid::new_v4());
    let requester = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![invited.id]))
        .await
        .unwrap();
    let invitation = attendees
        .find_record(appointment.id, invited.id)
        .await
        .unwrap()
        .unwrap();
    let request = service
        .request_to_join(&requester, appointment.id)
        .await
        .unwrap();

    // The invited user did not create the invitation.
    let err = service
        .withdraw(&invited, invitation.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    // The organizer did not create the request.
    let err = service.withdraw(&organizer, request.id).await.unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    service.withdraw(&organizer, invitation.id).await.unwrap();
    service.withdraw(&requester, request.id).await.unwrap();
    assert!(
        attendees
            .find_for_appointment(appointment.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_update_appointment_fields_and_authorization() {
    let (store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let outsider = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    let mut update = meetsync_core::models::appointment::UpdateAppointmentRequest::default();
    update.title = Some("Planning (moved)".to_string());
    update.start_time = Some(hm(15, 0));
    let err = service
        .update_appointment(&outsider, appointment.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, MeetError::UnauthorizedTransition(_)));

    let updated = service
        .update_appointment(&organizer, appointment.id, update)
        .await
        .unwrap();
    assert_eq!(updated.title, "Planning (moved)");
    assert_eq!(updated.start_time, hm(15, 0));
    // End time re-derived from the new start.
    assert_eq!(updated.end_time, hm(16, 0));

    let stored = AppointmentStore::new(store)
        .get(appointment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Planning (moved)");
}

#[tokio::test]
async fn test_participation_states() {
    let (_store, service, _attendees) = setup();
    let organizer = CurrentUser::new(Uuid::new_v4());
    let appointment = service
        .create_appointment(&organizer, create_request(vec![]))
        .await
        .unwrap();

    assert_eq!(
        service
            .participation(appointment.id, organizer.id)
            .await
            .unwrap(),
        Participation::Organizer
    );
    assert_eq!(
        service
            .participation(appointment.id, Uuid::new_v4())
            .await
            .unwrap(),
        Participation::None
    );
}
