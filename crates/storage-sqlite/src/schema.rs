// Mirrors migrations/2026-01-01-000000_create_hearth_tables/up.sql.

diesel::table! {
    pay_schedules (household_id) {
        household_id -> Text,
        mode -> Text,
        settings -> Text,
        created_at -> Timestamp,
        updated_by -> Nullable<Text>,
        updated_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    categories (id) {
        id -> Text,
        household_id -> Text,
        flow -> Text,
        kind -> Text,
        name -> Text,
        icon -> Nullable<Text>,
        sort -> Integer,
    }
}

diesel::table! {
    transactions (id) {
        id -> Text,
        household_id -> Text,
        created_by -> Nullable<Text>,
        tx_type -> Text,
        amount_cents -> BigInt,
        note -> Nullable<Text>,
        category_id -> Nullable<Text>,
        occurred_on -> Date,
        created_at -> Timestamp,
    }
}

diesel::table! {
    goals (id) {
        id -> Text,
        household_id -> Text,
        created_by -> Nullable<Text>,
        title -> Text,
        target_cents -> BigInt,
        desired_date -> Date,
        created_at -> Timestamp,
    }
}

diesel::table! {
    goal_contributions (household_id, goal_id, cycle_key) {
        household_id -> Text,
        goal_id -> Text,
        cycle_key -> Text,
        cycle_start -> Date,
        cycle_end -> Date,
        amount_cents -> BigInt,
        updated_by -> Nullable<Text>,
        updated_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    cycle_closures (household_id, cycle_key) {
        household_id -> Text,
        cycle_key -> Text,
        mode -> Text,
        cycle_start -> Date,
        cycle_end -> Date,
        net_cents -> BigInt,
        allocated_cents -> BigInt,
        created_at -> Timestamp,
        updated_by -> Nullable<Text>,
        updated_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    payment_methods (id) {
        id -> Text,
        household_id -> Text,
        created_by -> Nullable<Text>,
        method_type -> Text,
        name -> Text,
        credit_limit_cents -> Nullable<BigInt>,
        closing_day -> Nullable<Integer>,
        due_day -> Nullable<Integer>,
        limit_behavior -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    card_charges (id) {
        id -> Text,
        household_id -> Text,
        created_by -> Nullable<Text>,
        card_id -> Text,
        purchased_on -> Date,
        description -> Nullable<Text>,
        total_cents -> BigInt,
        installments_total -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    card_installments (id) {
        id -> Text,
        household_id -> Text,
        created_by -> Nullable<Text>,
        card_id -> Text,
        charge_id -> Text,
        n -> Integer,
        due_on -> Date,
        amount_cents -> BigInt,
        paid_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
    }
}

diesel::joinable!(goal_contributions -> goals (goal_id));
diesel::joinable!(card_charges -> payment_methods (card_id));
diesel::joinable!(card_installments -> card_charges (charge_id));

diesel::allow_tables_to_appear_in_same_query!(
    pay_schedules,
    categories,
    transactions,
    goals,
    goal_contributions,
    cycle_closures,
    payment_methods,
    card_charges,
    card_installments,
);
