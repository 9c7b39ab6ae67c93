diesel::table! {
    ticket (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        status -> Text,
        name -> Text,
        office -> Text,
        created_at -> Timestamp,
        deleted -> Bool,
    }
}

diesel::table! {
    ticket_action (id) {
        id -> Integer,
        ticket_id -> Integer,
        action_type -> Text,
        action_description -> Text,
        action_time -> Timestamp,
    }
}

diesel::table! {
    admin (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
    }
}

diesel::joinable!(ticket_action -> ticket (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(admin, ticket, ticket_action);
