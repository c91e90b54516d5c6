use super::*;
use crate::booking::storage::BookingStorage;

fn create_test_manager() -> BookingManager {
    let storage = BookingStorage::open_in_memory().unwrap();
    BookingManager::with_storage(storage)
}

/// Manager whose new holds are already past their deadline
fn create_expired_manager() -> BookingManager {
    let mut manager = create_test_manager();
    manager.reservation_ttl_ms = -60_000;
    manager
}

fn sample_trip(manager: &BookingManager) -> shared::models::Trip {
    sample_trip_with_seats(manager, 30)
}

fn sample_trip_with_seats(manager: &BookingManager, total_seats: u32) -> shared::models::Trip {
    manager
        .create_trip(TripDraft {
            bus_name: "Coaster 12".to_string(),
            plate_number: "RAB 123 C".to_string(),
            total_seats,
            price: 5000.0,
            departure_city: "Kigali".to_string(),
            destination_city: "Huye".to_string(),
            departure_time: shared::util::now_millis() + 86_400_000,
        })
        .unwrap()
}

/// Reserve + initiate + confirm, returning the confirmation
fn book_and_pay(
    manager: &BookingManager,
    user_id: i64,
    trip_id: i64,
    seat: &str,
) -> PaymentConfirmation {
    let reservation = manager.create_reservation(user_id, trip_id, seat).unwrap();
    let session = manager
        .initiate_payment(reservation.id, PaymentMethod::Card, None)
        .unwrap();
    manager
        .confirm_payment(&session.payment.transaction_id)
        .unwrap()
}

mod test_reservations;
