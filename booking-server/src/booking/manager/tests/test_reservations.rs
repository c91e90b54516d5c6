use super::*;

#[test]
fn test_create_reservation() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let reservation = manager.create_reservation(7, trip.id, "C4").unwrap();

    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.selected_seat, "C4");
    assert!(reservation.expires_at > reservation.created_at);

    let detail = manager.get_trip_detail(trip.id).unwrap();
    assert_eq!(detail.occupied_seats, ["C4"]);
    assert_eq!(detail.available_seats, 29);
}

#[test]
fn test_same_seat_cannot_be_double_booked() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    manager.create_reservation(7, trip.id, "B3").unwrap();
    let err = manager.create_reservation(8, trip.id, "B3").unwrap_err();
    assert!(matches!(err, BookingError::SeatOccupied { seat, .. } if seat == "B3"));

    // A different seat is still free
    manager.create_reservation(8, trip.id, "B4").unwrap();
    let detail = manager.get_trip_detail(trip.id).unwrap();
    assert_eq!(detail.occupied_seats, ["B3", "B4"]);
}

#[test]
fn test_seat_count_conservation() {
    let manager = create_test_manager();
    let trip = sample_trip_with_seats(&manager, 4);
    assert_eq!(trip.bus.seat_layout, ["A1", "A2", "A3", "A4"]);

    for (i, seat) in trip.bus.seat_layout.iter().enumerate() {
        manager.create_reservation(i as i64 + 1, trip.id, seat).unwrap();
    }

    let detail = manager.get_trip_detail(trip.id).unwrap();
    assert_eq!(detail.occupied_seats.len(), 4);
    assert_eq!(detail.available_seats, 0);

    manager
        .cancel_reservation(manager.list_user_reservations(2).unwrap()[0].reservation.id)
        .unwrap();

    let detail = manager.get_trip_detail(trip.id).unwrap();
    assert_eq!(detail.occupied_seats.len(), 3);
    assert_eq!(detail.available_seats, 1);
}

#[test]
fn test_seat_outside_plan_rejected() {
    let manager = create_test_manager();
    // 10 seats: A1..A4, B1..B4, C1, C2
    let trip = sample_trip_with_seats(&manager, 10);

    let err = manager.create_reservation(7, trip.id, "C3").unwrap_err();
    assert!(matches!(err, BookingError::SeatOutOfPlan { .. }));

    let err = manager.create_reservation(7, trip.id, "Z9").unwrap_err();
    assert!(matches!(err, BookingError::SeatOutOfPlan { seat } if seat == "Z9"));
}

#[test]
fn test_unknown_trip_rejected() {
    let manager = create_test_manager();
    let err = manager.create_reservation(7, 999, "A1").unwrap_err();
    assert!(matches!(err, BookingError::TripNotFound(999)));
}

#[test]
fn test_inactive_trip_rejected() {
    let manager = create_test_manager();
    let mut trip = sample_trip(&manager);

    trip.status = TripStatus::Suspended;
    let txn = manager.storage().begin_write().unwrap();
    manager.storage().store_trip(&txn, &trip).unwrap();
    txn.commit().unwrap();

    let err = manager.create_reservation(7, trip.id, "A1").unwrap_err();
    assert!(matches!(err, BookingError::TripNotActive(_)));
}

#[test]
fn test_concurrent_claims_on_same_seat() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let mut handles = Vec::new();
    for user_id in 0..8 {
        let manager = manager.clone();
        let trip_id = trip.id;
        handles.push(std::thread::spawn(move || {
            manager.create_reservation(user_id, trip_id, "A1")
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one claim must win the seat");
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r.as_ref().unwrap_err(), BookingError::SeatOccupied { .. })));

    let detail = manager.get_trip_detail(trip.id).unwrap();
    assert_eq!(detail.occupied_seats, ["A1"]);
}

#[test]
fn test_cancel_releases_seat_for_other_user() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let reservation = manager.create_reservation(7, trip.id, "A3").unwrap();
    let cancelled = manager.cancel_reservation(reservation.id).unwrap();

    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert!(manager.get_trip_detail(trip.id).unwrap().occupied_seats.is_empty());

    // Seat is bookable again by someone else
    let second = manager.create_reservation(8, trip.id, "A3").unwrap();
    assert_eq!(second.selected_seat, "A3");
}

#[test]
fn test_cancel_twice_rejected() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let reservation = manager.create_reservation(7, trip.id, "A3").unwrap();
    manager.cancel_reservation(reservation.id).unwrap();

    let err = manager.cancel_reservation(reservation.id).unwrap_err();
    assert!(matches!(err, BookingError::AlreadyCancelled(_)));
}

#[test]
fn test_cancel_confirmed_reservation_voids_ticket() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let confirmation = book_and_pay(&manager, 7, trip.id, "C1");
    manager.cancel_reservation(confirmation.reservation.id).unwrap();

    let detail = manager
        .get_reservation_detail(confirmation.reservation.id)
        .unwrap();
    assert_eq!(detail.reservation.status, ReservationStatus::Cancelled);
    assert_eq!(
        detail.ticket.unwrap().status,
        shared::models::TicketStatus::Cancelled
    );
    assert!(manager.get_trip_detail(trip.id).unwrap().occupied_seats.is_empty());
}

#[test]
fn test_reservation_detail_attaches_related_records() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    let reservation = manager.create_reservation(7, trip.id, "A2").unwrap();
    let detail = manager.get_reservation_detail(reservation.id).unwrap();

    assert_eq!(detail.trip.as_ref().unwrap().id, trip.id);
    assert!(detail.payment.is_none());
    assert!(detail.ticket.is_none());

    let err = manager.get_reservation_detail(12345).unwrap_err();
    assert!(matches!(err, BookingError::ReservationNotFound(12345)));
}

#[test]
fn test_list_user_reservations_scoped_to_owner() {
    let manager = create_test_manager();
    let trip = sample_trip(&manager);

    manager.create_reservation(7, trip.id, "A1").unwrap();
    manager.create_reservation(7, trip.id, "A2").unwrap();
    manager.create_reservation(8, trip.id, "A3").unwrap();

    assert_eq!(manager.list_user_reservations(7).unwrap().len(), 2);
    assert_eq!(manager.list_user_reservations(8).unwrap().len(), 1);
    assert!(manager.list_user_reservations(9).unwrap().is_empty());
}
