//! Diesel schema for task and audit event persistence.

diesel::table! {
    /// Collection tasks with their lifecycle stage timestamps.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Origin classification.
        #[max_length = 50]
        task_type -> Varchar,
        /// Optional uniqueness token enforced by `idx_tasks_dedup_key_unique`.
        #[max_length = 255]
        dedup_key -> Nullable<Varchar>,
        /// Stand reference.
        #[max_length = 255]
        stand_id -> Nullable<Varchar>,
        /// Station reference.
        #[max_length = 255]
        station_id -> Nullable<Varchar>,
        /// Material reference.
        #[max_length = 255]
        material_id -> Nullable<Varchar>,
        /// Hall reference.
        #[max_length = 255]
        hall_id -> Nullable<Varchar>,
        /// When the collection is due.
        scheduled_for -> Nullable<Timestamptz>,
        /// Stage timestamp for `PICKED_UP`.
        picked_up_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `IN_TRANSIT`.
        in_transit_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `DROPPED_OFF`.
        dropped_off_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `TAKEN_OVER`.
        taken_over_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `WEIGHED`.
        weighed_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `DISPOSED`.
        disposed_at -> Nullable<Timestamptz>,
        /// Stage timestamp for `CANCELLED`.
        cancelled_at -> Nullable<Timestamptz>,
        /// Recorded weight in kilograms.
        weight_kg -> Nullable<Float8>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit log of task status changes.
    task_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Insertion order, used as a tie-breaker for equal instants.
        sequence_number -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Status before the change; null for creation.
        #[max_length = 50]
        from_status -> Nullable<Varchar>,
        /// Status after the change.
        #[max_length = 50]
        to_status -> Varchar,
        /// Acting user; null for system actions.
        #[max_length = 255]
        actor_user_id -> Nullable<Varchar>,
        /// Role held when acting.
        #[max_length = 100]
        actor_role -> Varchar,
        /// Department of the acting user when acting.
        #[max_length = 255]
        actor_department_id -> Nullable<Varchar>,
        /// Event metadata object.
        meta -> Jsonb,
        /// Instant of the change.
        occurred_at -> Timestamptz,
    }
}

diesel::joinable!(task_events -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_events);
