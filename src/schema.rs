table! {
    user_tokens (id) {
        id -> Int4,
        user_id -> Text,
        fcm_token -> Text,
        platform -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    notification_history (id) {
        id -> Int4,
        user_id -> Text,
        title -> Text,
        body -> Text,
        data -> Text,
        feedback_id -> Nullable<Text>,
        created_at -> Timestamptz,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
    }
}

table! {
    feedback (id) {
        id -> Text,
        customer_name -> Text,
        content -> Text,
        created_at -> Timestamptz,
        assigned_user_id -> Nullable<Text>,
    }
}
