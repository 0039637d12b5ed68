//! Diesel schema for stand lookup.

diesel::table! {
    /// Collection stands; `created_at` and `updated_at` are left to column defaults.
    stands (id) {
        /// Stand identifier.
        #[max_length = 255]
        id -> Varchar,
        /// Station reference.
        #[max_length = 255]
        station_id -> Varchar,
        /// Material reference.
        #[max_length = 255]
        material_id -> Varchar,
        /// Hall reference.
        #[max_length = 255]
        hall_id -> Nullable<Varchar>,
        /// Emptied every day.
        daily_full -> Bool,
        /// In service.
        is_active -> Bool,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
