// Subset of the convention database schema read by the statistics queries.

diesel::table! {
    conventions (id) {
        id -> Int8,
        name -> Text,
        maximum_event_signups -> Nullable<Jsonb>,
    }
}

diesel::table! {
    event_categories (id) {
        id -> Int8,
        name -> Text,
    }
}

diesel::table! {
    events (id) {
        id -> Int8,
        convention_id -> Int8,
        event_category_id -> Nullable<Int8>,
        title -> Text,
        status -> Text,
        length_seconds -> Int4,
        registration_policy -> Nullable<Jsonb>,
    }
}

diesel::table! {
    runs (id) {
        id -> Int8,
        event_id -> Int8,
        starts_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    signups (id) {
        id -> Int8,
        run_id -> Int8,
        user_con_profile_id -> Nullable<Int8>,
        bucket_key -> Nullable<Text>,
        state -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    user_con_profiles (id) {
        id -> Int8,
        user_id -> Nullable<Int8>,
    }
}

diesel::table! {
    users (id) {
        id -> Int8,
        email -> Nullable<Text>,
    }
}

diesel::joinable!(runs -> events (event_id));
diesel::joinable!(signups -> runs (run_id));

diesel::allow_tables_to_appear_in_same_query!(
    conventions,
    event_categories,
    events,
    runs,
    signups,
    user_con_profiles,
    users,
);
