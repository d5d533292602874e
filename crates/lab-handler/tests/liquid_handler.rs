//! End-to-end tests of the liquid-handling frontend against the chatterbox
//! backend.

use lab_core::{LabError, VolumeError};
use lab_handler::backends::chatterbox::{ChatterboxBackend, SharedSink};
use lab_handler::{DeckLayout, LiquidHandler};
use lab_resources::catalog::{cos_96_ez_wash, flex_96_tiprack_200ul};

fn handler_with_sink() -> (LiquidHandler, SharedSink) {
    let sink = SharedSink::new();
    let backend = ChatterboxBackend::with_sink(8, sink.clone());
    (LiquidHandler::new(backend), sink)
}

async fn ready_handler() -> (LiquidHandler, SharedSink) {
    let (mut lh, sink) = handler_with_sink();
    lh.setup().await.unwrap();
    lh.assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C1", false)
        .await
        .unwrap();
    lh.assign_resource(cos_96_ez_wash("plate").unwrap(), "C2", false)
        .await
        .unwrap();
    (lh, sink)
}

fn seed_well(lh: &mut LiquidHandler, well: &str, volume: f64) {
    lh.deck_mut()
        .get_mut(well)
        .and_then(|w| w.tracker_mut())
        .unwrap()
        .set_volume(volume);
}

#[tokio::test]
async fn test_setup_and_stop() {
    let (mut lh, sink) = handler_with_sink();
    lh.setup().await.unwrap();
    lh.stop().await.unwrap();
    // Setup replays the pre-assigned trash to the backend.
    assert_eq!(
        sink.contents(),
        "Setting up the robot.\n\
         Resource trash_container was assigned to the robot.\n\
         Stopping the robot.\n"
    );
}

#[tokio::test]
async fn test_double_setup_is_an_error() {
    let (mut lh, _sink) = handler_with_sink();
    lh.setup().await.unwrap();
    assert!(matches!(lh.setup().await, Err(LabError::Setup(_))));
}

#[tokio::test]
async fn test_operations_require_setup() {
    let (mut lh, _sink) = handler_with_sink();
    let err = lh.pick_up_tips("tips", &["A1"], None).await.unwrap_err();
    assert!(matches!(err, LabError::Setup(_)));
}

#[tokio::test]
async fn test_assignment_is_forwarded_to_backend() {
    let (mut lh, sink) = handler_with_sink();
    lh.setup().await.unwrap();
    lh.assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C1", false)
        .await
        .unwrap();
    assert!(sink
        .contents()
        .contains("Resource tips was assigned to the robot.\n"));

    lh.unassign_resource("tips").await.unwrap();
    assert!(sink
        .contents()
        .contains("Resource tips was unassigned from the robot.\n"));
}

#[tokio::test]
async fn test_duplicate_name_rejected_unless_replace() {
    let (mut lh, _sink) = handler_with_sink();
    lh.setup().await.unwrap();
    lh.assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C1", false)
        .await
        .unwrap();

    let err = lh
        .assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C2", false)
        .await
        .unwrap_err();
    assert!(matches!(err, LabError::DuplicateResource(_)));

    // replace=true moves the labware to the new slot.
    lh.assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C2", true)
        .await
        .unwrap();
    assert_eq!(lh.deck().slot_of("tips"), Some("C2"));
    assert!(lh.deck().resource_at_slot("C1").is_none());
}

#[tokio::test]
async fn test_summary_requires_labware() {
    let (mut lh, _sink) = handler_with_sink();
    lh.setup().await.unwrap();
    assert!(matches!(lh.summary(), Err(LabError::Setup(_))));

    lh.assign_resource(flex_96_tiprack_200ul("tips").unwrap(), "C1", false)
        .await
        .unwrap();
    let summary = lh.summary().unwrap();
    assert!(summary.contains("C1: tips"));
}

#[tokio::test]
async fn test_tip_pickup_and_drop() {
    let (mut lh, sink) = ready_handler().await;

    lh.pick_up_tips("tips", &["A1", "B1"], None).await.unwrap();
    assert!(lh.channel_has_tip(0));
    assert!(lh.channel_has_tip(1));
    assert!(!lh.deck().get("tips_A1").unwrap().has_tip());
    assert!(sink.contents().contains("Picking up tips [tips_A1, tips_B1].\n"));

    lh.drop_tips("tips", &["A1", "B1"], None).await.unwrap();
    assert!(!lh.channel_has_tip(0));
    assert!(lh.deck().get("tips_A1").unwrap().has_tip());
    assert!(sink.contents().contains("Dropping tips [tips_A1, tips_B1].\n"));
}

#[tokio::test]
async fn test_pickup_with_tip_mounted_fails() {
    let (mut lh, _sink) = ready_handler().await;
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();
    let err = lh.pick_up_tips("tips", &["B1"], None).await.unwrap_err();
    assert!(matches!(err, LabError::HasTip(_)));
}

#[tokio::test]
async fn test_pickup_from_empty_spot_fails() {
    let (mut lh, _sink) = ready_handler().await;
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();
    lh.discard_tips(None).await.unwrap();
    let err = lh.pick_up_tips("tips", &["A1"], None).await.unwrap_err();
    assert!(matches!(err, LabError::NoTip(_)));
}

#[tokio::test]
async fn test_drop_on_occupied_spot_fails() {
    let (mut lh, _sink) = ready_handler().await;
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();
    let err = lh.drop_tips("tips", &["B1"], None).await.unwrap_err();
    assert!(matches!(err, LabError::HasTip(_)));
    // The failed drop left the mounted tip in place.
    assert!(lh.channel_has_tip(0));
}

#[tokio::test]
async fn test_explicit_channels() {
    let (mut lh, _sink) = ready_handler().await;
    lh.pick_up_tips("tips", &["A1"], Some(&[3])).await.unwrap();
    assert!(!lh.channel_has_tip(0));
    assert!(lh.channel_has_tip(3));

    let err = lh
        .pick_up_tips("tips", &["B1"], Some(&[8]))
        .await
        .unwrap_err();
    assert!(matches!(err, LabError::NoChannel(_)));

    let err = lh
        .pick_up_tips("tips", &["B1", "C1"], Some(&[4]))
        .await
        .unwrap_err();
    assert!(matches!(err, LabError::NoChannel(_)));
}

#[tokio::test]
async fn test_duplicate_channels_rejected() {
    let (mut lh, _sink) = ready_handler().await;
    let err = lh
        .pick_up_tips("tips", &["A1", "B1"], Some(&[2, 2]))
        .await
        .unwrap_err();
    assert!(matches!(err, LabError::NoChannel(_)));
    // Nothing was picked up.
    assert!(!lh.channel_has_tip(2));
    assert!(lh.deck().get("tips_A1").unwrap().has_tip());
    assert!(lh.deck().get("tips_B1").unwrap().has_tip());
}

#[tokio::test]
async fn test_discard_tips_defaults_to_mounted_channels() {
    let (mut lh, sink) = ready_handler().await;
    lh.pick_up_tips("tips", &["A1", "B1"], Some(&[0, 5]))
        .await
        .unwrap();
    lh.discard_tips(None).await.unwrap();
    assert!(!lh.channel_has_tip(0));
    assert!(!lh.channel_has_tip(5));
    assert!(sink.contents().contains("Dropping tips [trash, trash].\n"));

    // Nothing mounted: a no-op, not an error.
    lh.discard_tips(None).await.unwrap();
}

#[tokio::test]
async fn test_aspirate_requires_tip() {
    let (mut lh, _sink) = ready_handler().await;
    seed_well(&mut lh, "plate_A1", 100.0);
    let err = lh
        .aspirate("plate", &["A1"], &[50.0], None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LabError::NoTip(_)));
}

#[tokio::test]
async fn test_aspirate_and_dispense_track_volumes() {
    let (mut lh, sink) = ready_handler().await;
    seed_well(&mut lh, "plate_A1", 100.0);
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();

    lh.aspirate("plate", &["A1"], &[60.0], None, None)
        .await
        .unwrap();
    assert_eq!(
        lh.get_resource("plate_A1").unwrap().tracker().unwrap().current_volume(),
        40.0
    );
    assert!(sink.contents().contains("Aspirating [60 uL from plate_A1].\n"));

    lh.dispense("plate", &["B1"], &[60.0], None, None, None)
        .await
        .unwrap();
    assert_eq!(
        lh.get_resource("plate_B1").unwrap().tracker().unwrap().current_volume(),
        60.0
    );
    assert!(sink.contents().contains("Dispensing [60 uL into plate_B1].\n"));
}

#[tokio::test]
async fn test_aspirate_more_than_available_fails_before_backend() {
    let (mut lh, sink) = ready_handler().await;
    seed_well(&mut lh, "plate_A1", 10.0);
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();

    let err = lh
        .aspirate("plate", &["A1"], &[50.0], None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LabError::Volume(VolumeError::TooLittleLiquid { .. })
    ));
    // The backend never saw the operation.
    assert!(!sink.contents().contains("Aspirating"));
    assert_eq!(
        lh.get_resource("plate_A1").unwrap().tracker().unwrap().current_volume(),
        10.0
    );
}

#[tokio::test]
async fn test_dispense_overflow_fails() {
    let (mut lh, _sink) = ready_handler().await;
    seed_well(&mut lh, "plate_A1", 240.0);
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();

    // cos_96_ez_wash wells hold 250 uL.
    let err = lh
        .dispense("plate", &["A1"], &[20.0], None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LabError::Volume(VolumeError::TooLittleVolume { .. })
    ));
}

#[tokio::test]
async fn test_disabled_trackers_accept_anything() {
    let (mut lh, _sink) = ready_handler().await;
    lh.deck_mut()
        .get_mut("plate")
        .unwrap()
        .disable_volume_trackers();
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();
    lh.aspirate("plate", &["A1"], &[5000.0], None, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transfer() {
    let (mut lh, _sink) = ready_handler().await;
    seed_well(&mut lh, "plate_A1", 100.0);
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();

    lh.transfer("plate", "A1", "plate", "H12", 30.0).await.unwrap();
    assert_eq!(
        lh.get_resource("plate_A1").unwrap().tracker().unwrap().current_volume(),
        70.0
    );
    assert_eq!(
        lh.get_resource("plate_H12").unwrap().tracker().unwrap().current_volume(),
        30.0
    );
}

#[tokio::test]
async fn test_96_head_round_trip() {
    let (mut lh, sink) = ready_handler().await;

    lh.pick_up_tips96("tips").await.unwrap();
    assert!(!lh.deck().get("tips_A1").unwrap().has_tip());
    assert!(!lh.deck().get("tips_H12").unwrap().has_tip());
    assert!(sink.contents().contains("Picking up tips from tips.\n"));

    lh.drop_tips96("tips").await.unwrap();
    assert!(lh.deck().get("tips_A1").unwrap().has_tip());

    lh.dispense96("plate", 40.0).await.unwrap();
    assert_eq!(
        lh.get_resource("plate_D6").unwrap().tracker().unwrap().current_volume(),
        40.0
    );
    lh.aspirate96("plate", 15.0).await.unwrap();
    assert_eq!(
        lh.get_resource("plate_D6").unwrap().tracker().unwrap().current_volume(),
        25.0
    );
}

#[tokio::test]
async fn test_dispense96_rejects_before_backend_when_one_well_is_full() {
    let (mut lh, sink) = ready_handler().await;
    seed_well(&mut lh, "plate_B1", 245.0);

    let err = lh.dispense96("plate", 10.0).await.unwrap_err();
    assert!(matches!(
        err,
        LabError::Volume(VolumeError::TooLittleVolume { .. })
    ));
    // The backend never ran and no tracker moved.
    assert!(!sink.contents().contains("Dispensing"));
    assert_eq!(
        lh.get_resource("plate_A1").unwrap().tracker().unwrap().current_volume(),
        0.0
    );
    assert_eq!(
        lh.get_resource("plate_B1").unwrap().tracker().unwrap().current_volume(),
        245.0
    );
}

#[tokio::test]
async fn test_aspirate96_rejects_before_backend_when_wells_are_short() {
    let (mut lh, sink) = ready_handler().await;
    // All wells empty: any aspiration must fail up front.
    let err = lh.aspirate96("plate", 5.0).await.unwrap_err();
    assert!(matches!(
        err,
        LabError::Volume(VolumeError::TooLittleLiquid { .. })
    ));
    assert!(!sink.contents().contains("Aspirating"));
}

#[tokio::test]
async fn test_move_resource() {
    let (mut lh, sink) = ready_handler().await;
    lh.move_resource("plate", "B2").await.unwrap();
    assert_eq!(lh.deck().slot_of("plate"), Some("B2"));
    assert!(lh.deck().resource_at_slot("C2").is_none());
    assert!(sink.contents().contains("Moving plate to B2.\n"));

    let err = lh.move_resource("plate", "Z9").await.unwrap_err();
    assert!(matches!(err, LabError::InvalidSlot(_)));
}

#[tokio::test]
async fn test_home() {
    let (mut lh, sink) = ready_handler().await;
    lh.home().await.unwrap();
    assert!(sink.contents().contains("Homing the robot.\n"));
}

#[tokio::test]
async fn test_handler_from_layout() {
    let layout = DeckLayout::from_toml_str(
        r#"
        [slots]
        C1 = { kind = "flex_96_tiprack_200ul", name = "tips" }
        C2 = { kind = "cos_96_ez_wash", name = "plate" }
        "#,
    )
    .unwrap();
    let deck = layout.build().unwrap();

    let sink = SharedSink::new();
    let backend = ChatterboxBackend::with_sink(8, sink.clone());
    let mut lh = LiquidHandler::with_deck(backend, deck);
    lh.setup().await.unwrap();
    lh.pick_up_tips("tips", &["A1"], None).await.unwrap();
    assert!(lh.channel_has_tip(0));
}
