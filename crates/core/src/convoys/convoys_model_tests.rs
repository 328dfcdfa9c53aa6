//! Tests for convoy domain models.

#[cfg(test)]
mod tests {
    use crate::convoys::{Convoy, ConvoyRow};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_row_maps_by_renaming_only() {
        let row: ConvoyRow = serde_json::from_value(json!({
            "id": "c1",
            "departure_date": "2024-01-10",
            "price_per_kg": 2500,
            "carrier_address": "Addr X",
            "carrier_name": "Fast Co",
            "destination": "Bamako",
            "available_space": 75,
            "is_active": true
        }))
        .unwrap();

        let convoy = Convoy::from(row);
        let value = serde_json::to_value(&convoy).unwrap();

        assert_eq!(value["id"], "c1");
        assert_eq!(value["departureDate"], "2024-01-10");
        assert_eq!(value["carrierAddress"], "Addr X");
        assert_eq!(value["carrierName"], "Fast Co");
        assert_eq!(value["destination"], "Bamako");
        // Numbers are compared by value: decimals serialize as JSON floats.
        assert_eq!(value["pricePerKg"].as_f64(), Some(2500.0));
        assert_eq!(value["availableSpace"].as_f64(), Some(75.0));
        assert_eq!(value.as_object().map(|o| o.len()), Some(7));
        assert_eq!(convoy.price_per_kg, dec!(2500));
    }

    #[test]
    fn test_departure_date_is_carried_verbatim() {
        let row: ConvoyRow = serde_json::from_value(json!({
            "id": "c2",
            "departure_date": "2024-03-01T08:30:00+00:00",
            "price_per_kg": 3000.5,
            "carrier_address": "Rue 12, Abidjan",
            "carrier_name": "Sahel Cargo",
            "destination": "Dakar",
            "available_space": 0,
            "is_active": true,
            "created_at": "2024-02-01T10:00:00+00:00",
            "updated_at": "2024-02-02T10:00:00+00:00"
        }))
        .unwrap();

        let convoy = Convoy::from(row);
        assert_eq!(convoy.departure_date, "2024-03-01T08:30:00+00:00");
        assert_eq!(convoy.price_per_kg, dec!(3000.5));
        assert_eq!(convoy.available_space, 0.0);
    }

    #[test]
    fn test_fractional_available_space() {
        let row: ConvoyRow = serde_json::from_value(json!({
            "id": "c4",
            "departure_date": "2024-01-10",
            "price_per_kg": 2500,
            "carrier_address": "Addr X",
            "carrier_name": "Fast Co",
            "destination": "Bamako",
            "available_space": 75.5
        }))
        .unwrap();

        assert_eq!(Convoy::from(row).available_space, 75.5);
    }

    #[test]
    fn test_missing_active_flag_defaults_to_active() {
        let row: ConvoyRow = serde_json::from_value(json!({
            "id": "c3",
            "departure_date": "2024-01-10",
            "price_per_kg": 1,
            "carrier_address": "",
            "carrier_name": "",
            "destination": "",
            "available_space": 100
        }))
        .unwrap();

        assert!(row.is_active);
        assert!(row.created_at.is_none());
    }
}
